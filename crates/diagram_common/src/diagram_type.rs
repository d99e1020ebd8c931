//! The fixed set of diagram languages the rendering service understands.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! diagram_types {
    ($( $(#[$doc:meta])* $variant:ident => $name:literal, )+) => {
        /// A supported diagram language.
        ///
        /// The lowercase name is used as the fenced code block info string, as
        /// the leading segment of every artifact filename, and as the endpoint
        /// path on the rendering service.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum DiagramType {
            $( $(#[$doc])* $variant, )+
        }

        impl DiagramType {
            /// Every supported diagram type, in declaration order.
            pub const ALL: &'static [DiagramType] = &[ $( DiagramType::$variant, )+ ];

            /// Returns the canonical lowercase name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( DiagramType::$variant => $name, )+
                }
            }
        }
    };
}

diagram_types! {
    /// blockdiag block diagrams.
    Blockdiag => "blockdiag",
    /// BPMN process diagrams.
    Bpmn => "bpmn",
    /// bytefield-svg byte layouts.
    Bytefield => "bytefield",
    /// seqdiag sequence diagrams.
    Seqdiag => "seqdiag",
    /// actdiag activity diagrams.
    Actdiag => "actdiag",
    /// nwdiag network diagrams.
    Nwdiag => "nwdiag",
    /// packetdiag packet headers.
    Packetdiag => "packetdiag",
    /// rackdiag rack layouts.
    Rackdiag => "rackdiag",
    /// C4 model with PlantUML.
    C4Plantuml => "c4plantuml",
    /// D2 declarative diagrams.
    D2 => "d2",
    /// DBML database schemas.
    Dbml => "dbml",
    /// ditaa ASCII art.
    Ditaa => "ditaa",
    /// erd entity-relationship diagrams.
    Erd => "erd",
    /// Excalidraw sketches.
    Excalidraw => "excalidraw",
    /// Graphviz DOT.
    Graphviz => "graphviz",
    /// Mermaid.
    Mermaid => "mermaid",
    /// nomnoml UML.
    Nomnoml => "nomnoml",
    /// Pikchr.
    Pikchr => "pikchr",
    /// PlantUML.
    Plantuml => "plantuml",
    /// Structurizr DSL.
    Structurizr => "structurizr",
    /// Svgbob ASCII art.
    Svgbob => "svgbob",
    /// Symbolator component symbols.
    Symbolator => "symbolator",
    /// TikZ.
    Tikz => "tikz",
    /// UMLet.
    Umlet => "umlet",
    /// Vega visualizations.
    Vega => "vega",
    /// Vega-Lite visualizations.
    VegaLite => "vega-lite",
    /// WaveDrom timing diagrams.
    Wavedrom => "wavedrom",
    /// WireViz harness diagrams.
    Wireviz => "wireviz",
}

/// Error returned for a diagram language outside the supported list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported diagram type: {0}")]
pub struct UnknownDiagramType(pub String);

impl FromStr for DiagramType {
    type Err = UnknownDiagramType;

    /// Case-insensitive exact match on the trimmed input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownDiagramType(s.to_string()))
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DiagramType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DiagramType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
