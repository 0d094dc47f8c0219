use serde::{Deserialize, Serialize};

/// Which way a contig's sequence runs along a scaffold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Strand {
    #[must_use]
    pub fn is_reverse(self) -> bool {
        matches!(self, Strand::Reverse)
    }

    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    /// Parse a node orientation attribute (`FOW`/`REV`, or `+`/`-`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FOW" | "FWD" | "FORWARD" | "+" => Some(Strand::Forward),
            "REV" | "REVERSE" | "-" => Some(Strand::Reverse),
            _ => None,
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// Orientation carried by a scaffold link.
///
/// The two letters name the contig ends that are joined: `E` means the
/// source contig is read forward into the link (its end is used), `B` on the
/// target side means the target is read forward out of it (its beginning is
/// used).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LinkOrientation {
    /// Source forward, target forward
    #[default]
    EB,
    /// Source forward, target reverse
    EE,
    /// Source reverse, target forward
    BB,
    /// Source reverse, target reverse
    BE,
}

impl LinkOrientation {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EB" => Some(LinkOrientation::EB),
            "EE" => Some(LinkOrientation::EE),
            "BB" => Some(LinkOrientation::BB),
            "BE" => Some(LinkOrientation::BE),
            _ => None,
        }
    }

    /// Build the link orientation implied by the strands of its endpoints
    #[must_use]
    pub fn from_strands(source: Strand, target: Strand) -> Self {
        match (source, target) {
            (Strand::Forward, Strand::Forward) => LinkOrientation::EB,
            (Strand::Forward, Strand::Reverse) => LinkOrientation::EE,
            (Strand::Reverse, Strand::Forward) => LinkOrientation::BB,
            (Strand::Reverse, Strand::Reverse) => LinkOrientation::BE,
        }
    }

    #[must_use]
    pub fn source_strand(self) -> Strand {
        match self {
            LinkOrientation::EB | LinkOrientation::EE => Strand::Forward,
            LinkOrientation::BB | LinkOrientation::BE => Strand::Reverse,
        }
    }

    #[must_use]
    pub fn target_strand(self) -> Strand {
        match self {
            LinkOrientation::EB | LinkOrientation::BB => Strand::Forward,
            LinkOrientation::EE | LinkOrientation::BE => Strand::Reverse,
        }
    }

    /// True when crossing this link changes the relative strand
    #[must_use]
    pub fn flips_strand(self) -> bool {
        self.source_strand() != self.target_strand()
    }

    /// Strand of the contig on the far side of the link, given the strand
    /// already assigned to the near side. Symmetric in direction.
    #[must_use]
    pub fn propagate(self, near: Strand) -> Strand {
        if self.flips_strand() {
            near.flip()
        } else {
            near
        }
    }
}

impl std::fmt::Display for LinkOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LinkOrientation::EB => "EB",
            LinkOrientation::EE => "EE",
            LinkOrientation::BB => "BB",
            LinkOrientation::BE => "BE",
        };
        write!(f, "{s}")
    }
}
