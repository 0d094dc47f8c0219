use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::graph::ScaffoldGraph;
use crate::delinking::cycles::choose_start;
use crate::parsing;

#[derive(Args)]
pub struct InspectArgs {
    /// Scaffold graph: GML (.gml) or tab-separated link list
    #[arg(short, long)]
    pub graph: PathBuf,
}

/// Shape of one weakly connected component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentShape {
    pub id: usize,
    pub contigs: usize,
    pub links: usize,
    pub start: String,
    pub start_in_degree: usize,
    pub cyclic: bool,
    pub needs_simplification: bool,
}

/// Shapes of all components of `graph`, in discovery order
pub fn component_shapes(graph: &ScaffoldGraph) -> Vec<ComponentShape> {
    graph
        .component_subgraphs()
        .iter()
        .enumerate()
        .filter_map(|(i, component)| {
            let (start, in_degree) = choose_start(component)?;
            let cyclic = component.is_cyclic();
            Some(ComponentShape {
                id: i + 1,
                contigs: component.node_count(),
                links: component.edge_count(),
                start: component.contig_id(start).to_string(),
                start_in_degree: in_degree,
                cyclic,
                needs_simplification: in_degree > 0 || cyclic,
            })
        })
        .collect()
}

pub fn run(args: InspectArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let graph = parsing::graph_file(&args.graph)
        .with_context(|| format!("Failed to read scaffold graph {}", args.graph.display()))?;
    let shapes = component_shapes(&graph);

    match format {
        OutputFormat::Text => print_text_shapes(&args, &graph, &shapes, verbose),
        OutputFormat::Json => print_json_shapes(&args, &graph, &shapes)?,
        OutputFormat::Tsv => print_tsv_shapes(&shapes),
    }

    Ok(())
}

fn print_text_shapes(
    args: &InspectArgs,
    graph: &ScaffoldGraph,
    shapes: &[ComponentShape],
    verbose: bool,
) {
    println!("Scaffold Graph: {}", args.graph.display());
    println!("{}", "=".repeat(60));
    println!("\nContigs: {}", graph.node_count());
    println!("Links: {}", graph.edge_count());
    println!("Components: {}", shapes.len());
    println!(
        "Components needing simplification: {}",
        shapes.iter().filter(|s| s.needs_simplification).count()
    );

    println!();
    for shape in shapes {
        // Singletons are only listed in verbose mode
        if shape.contigs == 1 && !verbose {
            continue;
        }
        println!(
            "  {:>5}  {:>6} contigs  {:>6} links  start {}{}",
            shape.id,
            shape.contigs,
            shape.links,
            shape.start,
            if shape.needs_simplification {
                "  (needs simplification)"
            } else {
                ""
            }
        );
    }
}

fn print_json_shapes(
    args: &InspectArgs,
    graph: &ScaffoldGraph,
    shapes: &[ComponentShape],
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "graph": args.graph.display().to_string(),
        "contigs": graph.node_count(),
        "links": graph.edge_count(),
        "components": shapes,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_shapes(shapes: &[ComponentShape]) {
    println!("component\tcontigs\tlinks\tstart\tstart_in_degree\tcyclic\tneeds_simplification");
    for s in shapes {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.id, s.contigs, s.links, s.start, s.start_in_degree, s.cyclic, s.needs_simplification
        );
    }
}
