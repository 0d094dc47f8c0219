//! End-to-end delinking scenarios through the public library API.

use scaffold_delink::core::graph::ScaffoldGraph;
use scaffold_delink::delinking::changepoint::{detect, identify_outliers};
use scaffold_delink::delinking::cycles::resolve;
use scaffold_delink::delinking::engine::{ComponentOrigin, DelinkOutcome};
use scaffold_delink::delinking::outliers::filter_neighbors;
use scaffold_delink::parsing::{depth, gml, links};
use scaffold_delink::{
    ComponentId, CoverageTable, DelinkingConfig, DelinkingEngine, DelinkingReport,
    LinkOrientation, Strand,
};

fn chain_graph() -> ScaffoldGraph {
    links::parse_links_text("A\tB\nB\tC\n").unwrap()
}

fn chain_coverage(c_depth: u32) -> CoverageTable {
    let mut coverage = CoverageTable::new();
    coverage.insert("A", vec![5; 10]);
    coverage.insert("B", vec![5; 20]);
    coverage.insert("C", vec![c_depth; 15]);
    coverage
}

fn run(graph: &ScaffoldGraph, coverage: &CoverageTable) -> DelinkingReport {
    DelinkingEngine::new(DelinkingConfig::default())
        .run(graph, coverage)
        .unwrap()
}

fn placements(report: &DelinkingReport, before: usize) -> Vec<(String, u64, u64)> {
    report.components[before]
        .layout
        .coords
        .iter()
        .map(|p| (p.contig.clone(), p.start, p.end))
        .collect()
}

fn link_names(graph: &ScaffoldGraph) -> Vec<(String, String)> {
    let mut names: Vec<_> = graph
        .links()
        .map(|(s, t, _)| (graph.contig_id(s).to_string(), graph.contig_id(t).to_string()))
        .collect();
    names.sort();
    names
}

/// Every component tiles its coordinate line and its profile matches it
fn assert_layout_invariants(report: &DelinkingReport, coverage: &CoverageTable) {
    let layouts = report
        .components
        .iter()
        .map(|c| &c.layout)
        .chain(report.final_components().map(|f| &f.layout));

    for layout in layouts {
        assert_eq!(layout.coords.check_tiling(), Ok(()));
        let expected: u64 = layout
            .coords
            .iter()
            .map(|p| coverage.length(&p.contig).unwrap_or(0))
            .sum();
        assert_eq!(layout.profile.len() as u64, expected);
        assert_eq!(layout.coords.total_length(), expected);
    }
}

#[test]
fn test_linear_chain_with_uniform_coverage() {
    let graph = chain_graph();
    let coverage = chain_coverage(5);
    let report = run(&graph, &coverage);

    assert_eq!(report.components.len(), 1);
    assert_eq!(
        placements(&report, 0),
        vec![
            ("A".to_string(), 0, 10),
            ("B".to_string(), 10, 30),
            ("C".to_string(), 30, 45)
        ]
    );
    assert!(report.components[0].outliers.is_empty());

    let finals: Vec<_> = report.final_components().collect();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].summary.span, 45);
    assert!((finals[0].summary.mean - 5.0).abs() < 1e-9);
    assert!(finals[0].summary.std_dev.abs() < 1e-9);
    assert_layout_invariants(&report, &coverage);
}

#[test]
fn test_single_abrupt_jump_splits_at_junction() {
    let graph = chain_graph();
    let coverage = chain_coverage(50);
    let report = run(&graph, &coverage);

    let component = &report.components[0];
    assert_eq!(component.outliers, vec![30]);
    assert_eq!(
        component.outcome,
        DelinkOutcome::Split {
            removed_links: vec![("B".to_string(), "C".to_string())]
        }
    );

    let finals: Vec<_> = report.final_components().collect();
    assert_eq!(finals.len(), 2);

    let contigs: Vec<Vec<&str>> = finals
        .iter()
        .map(|f| f.layout.coords.iter().map(|p| p.contig.as_str()).collect())
        .collect();
    assert_eq!(contigs, vec![vec!["A", "B"], vec!["C"]]);

    assert_eq!(finals[0].summary.span, 30);
    assert!((finals[0].summary.mean - 5.0).abs() < 1e-9);
    assert_eq!(finals[1].summary.span, 15);
    assert!((finals[1].summary.mean - 50.0).abs() < 1e-9);
    assert_eq!(finals[1].layout.coords.get("C").map(|p| p.start), Some(0));
    assert_layout_invariants(&report, &coverage);
}

#[test]
fn test_contig_absent_from_coverage() {
    let graph = links::parse_links_text("A\tB\nB\tC\nC\tD\n").unwrap();
    let coverage = chain_coverage(5);
    let report = run(&graph, &coverage);

    assert_eq!(report.not_found, vec!["D".to_string()]);
    assert_eq!(report.components.len(), 2);

    let graph_component = &report.components[0];
    assert_eq!(graph_component.origin, ComponentOrigin::Graph);
    assert!(graph_component.layout.coords.get("D").is_none());
    assert_eq!(graph_component.layout.coords.len(), 3);

    let missing = &report.components[1];
    assert_eq!(missing.origin, ComponentOrigin::MissingCoverage);
    assert_eq!(missing.id, ComponentId(2));
    let piece = &missing.pieces[0];
    assert_eq!(piece.layout.coords.get("D").map(|p| p.len()), Some(0));
    assert_eq!(piece.summary.span, 0);
    assert!(piece.summary.mean.is_nan());
    assert!(piece.summary.std_dev.is_nan());
}

#[test]
fn test_cyclic_component_is_resolved_and_tiles() {
    let graph = gml::parse_gml_text(
        r#"graph [
             node [ id 1 label "X" ] node [ id 2 label "Y" ] node [ id 3 label "Z" ]
             edge [ source 1 target 2 ] edge [ source 2 target 3 ] edge [ source 3 target 1 ]
           ]"#,
    )
    .unwrap();
    let mut coverage = CoverageTable::new();
    coverage.insert("X", vec![8; 12]);
    coverage.insert("Y", vec![8; 7]);
    coverage.insert("Z", vec![8; 9]);

    let report = run(&graph, &coverage);
    let component = &report.components[0];
    assert!(!component.simplified_links.is_empty());
    assert_eq!(component.layout.coords.total_length(), 12 + 7 + 9);
    assert_eq!(
        placements(&report, 0),
        vec![
            ("X".to_string(), 0, 12),
            ("Y".to_string(), 12, 19),
            ("Z".to_string(), 19, 28)
        ]
    );
    assert!(report.failures.is_empty());
    assert_layout_invariants(&report, &coverage);
}

#[test]
fn test_cycle_resolution_is_idempotent() {
    let graph = links::parse_links_text(
        "A\tB\nB\tC\nC\tA\nC\tD\nD\tB\nD\tD\nE\tD\n",
    )
    .unwrap();

    let once = resolve(&graph).unwrap();
    let twice = resolve(&once.graph).unwrap();

    assert!(!once.graph.is_cyclic());
    assert_eq!(once.graph.node_count(), graph.node_count());
    assert_eq!(twice.graph.in_degree(twice.start), 0);
    assert!(twice.removed.is_empty());
    assert_eq!(link_names(&once.graph), link_names(&twice.graph));
}

#[test]
fn test_reverse_strand_coverage_is_reversed() {
    let mut graph = ScaffoldGraph::new();
    graph.add_link("A", "B", LinkOrientation::EE);
    let mut coverage = CoverageTable::new();
    coverage.insert("A", vec![4, 4]);
    coverage.insert("B", vec![1, 2, 3]);

    let report = run(&graph, &coverage);
    let layout = &report.components[0].layout;
    assert_eq!(layout.coords.get("B").map(|p| p.strand), Some(Strand::Reverse));
    assert_eq!(layout.profile, vec![4, 4, 3, 2, 1]);
}

#[test]
fn test_delinking_monotonicity() {
    // A staircase of depths along a longer chain with a branch
    let graph = links::parse_links_text(
        "c1\tc2\nc2\tc3\nc3\tc4\nc4\tc5\nc2\tc6\nc6\tc5\n",
    )
    .unwrap();
    let mut coverage = CoverageTable::new();
    for (i, contig) in ["c1", "c2", "c3", "c4", "c5", "c6"].iter().enumerate() {
        let depth = if i % 2 == 0 { 10 } else { 80 };
        coverage.insert(*contig, vec![depth; 40 + 5 * i]);
    }

    let config = DelinkingConfig {
        window_size: 20,
        outlier_percentile: 90.0,
        neighbor_radius: 10,
        position_cutoff: 10,
        threads: Some(3),
    };
    let report = DelinkingEngine::new(config).run(&graph, &coverage).unwrap();

    for component in &report.components {
        let nodes = component.layout.coords.len();
        assert!(!component.pieces.is_empty());
        assert!(component.pieces.len() <= nodes);

        let piece_contigs: usize = component.pieces.iter().map(|p| p.layout.coords.len()).sum();
        assert_eq!(piece_contigs, nodes);
    }
    let ids: Vec<usize> = report.final_components().map(|f| f.id.0).collect();
    assert_eq!(ids, (1..=ids.len()).collect::<Vec<_>>());
    assert_layout_invariants(&report, &coverage);
}

#[test]
fn test_thread_count_does_not_change_output() {
    let text = "A\tB\nB\tC\nP\tQ\nX\tY\nY\tX\n";
    let graph = links::parse_links_text(text).unwrap();
    let contigs = [
        ("A", 10, 5),
        ("B", 20, 5),
        ("C", 15, 50),
        ("P", 30, 7),
        ("Q", 30, 70),
        ("X", 5, 3),
        ("Y", 5, 3),
        ("U", 4, 9),
    ];
    let depth_rows: String = contigs
        .iter()
        .flat_map(|&(contig, len, d)| {
            (1..=len).map(move |pos| format!("{contig}\t{pos}\t{d}\n"))
        })
        .collect();
    let coverage = depth::parse_depth_text(&depth_rows).unwrap();

    let summarize = |threads: usize| -> Vec<(usize, usize, u64, String)> {
        let config = DelinkingConfig {
            window_size: 10,
            threads: Some(threads),
            ..DelinkingConfig::default()
        };
        DelinkingEngine::new(config)
            .run(&graph, &coverage)
            .unwrap()
            .final_components()
            .map(|f| (f.id.0, f.parent.0, f.summary.span, format!("{:.3}", f.summary.mean)))
            .collect()
    };

    assert_eq!(summarize(1), summarize(4));
}

#[test]
fn test_neighbor_filter_convergence() {
    // Deterministic pseudo-random scores
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let scores: Vec<f64> = (0..500)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 1000) as f64 / 10.0
        })
        .collect();
    let flagged = identify_outliers(&scores, 80.0);
    let radius = 7;
    let kept = filter_neighbors(&flagged, &scores, radius);

    assert!(!kept.is_empty());
    for pair in kept.windows(2) {
        assert!(pair[1] - pair[0] > radius);
    }
    for &p in &flagged {
        if kept.contains(&p) {
            continue;
        }
        assert!(kept
            .iter()
            .any(|&k| k.abs_diff(p) <= radius && scores[k] >= scores[p]));
    }
}

#[test]
fn test_detect_shrinks_window_for_short_profiles() {
    let scores = detect(&[1, 1, 9], 1500);
    assert_eq!(scores.len(), 3);
    assert_eq!(scores[0], 0.0);
    assert!(scores[2] > 0.0);
}
