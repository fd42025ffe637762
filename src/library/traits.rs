//! Standard trait families and their stock implementations.
//!
//! | Family | Attached to | Capability |
//! |--------|-------------|------------|
//! | `can_bridge` | two-terminal modules | designated in/out interfaces |
//! | `has_footprint` | components | the footprint node |
//! | `has_kicad_footprint` | components | footprint plus library name |
//! | `has_footprint_pinmap` | components | pin -> `Electrical` mapping |
//! | `has_type_description` | components | value text, e.g. `10kΩ` |
//! | `has_designator` | components | e.g. `R3` |
//! | `has_designator_prefix` | components | e.g. `R` |
//! | `has_overridden_name` | nets | explicit net name |
//! | `has_pcb_position` | any node | placement |
//! | `has_pcb_layout` | modules | placements of named children |
//! | `has_single_end_partner` | direct links | the opposite end |

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::model::{InterfaceId, NodeId, ObjectRef, Parameter};
use crate::provides;
use crate::traits::{Casts, Family, FamilyInfo, TraitImpl};

/// Implements [`TraitImpl`] for a type that always provides its family.
macro_rules! always_implemented {
    ($imp:ty, $family:expr => $($capability:ident),+) => {
        provides!($imp => $($capability),+);

        impl TraitImpl for $imp {
            fn family(&self) -> &'static FamilyInfo {
                &$family
            }

            fn casts(&self) -> Casts {
                Casts::new()$(.with::<dyn $capability, Self>())+
            }
        }
    };
}

macro_rules! family {
    ($capability:ident, $info:ident) => {
        impl Family for dyn $capability {
            fn info() -> &'static FamilyInfo {
                &$info
            }
        }
    };
}

// ============================================================================
// Families
// ============================================================================

pub static CAN_BRIDGE: FamilyInfo = FamilyInfo::root("can_bridge");
pub static HAS_FOOTPRINT: FamilyInfo = FamilyInfo::root("has_footprint");
pub static HAS_KICAD_FOOTPRINT: FamilyInfo = FamilyInfo::child("has_kicad_footprint", &HAS_FOOTPRINT);
pub static HAS_FOOTPRINT_PINMAP: FamilyInfo = FamilyInfo::root("has_footprint_pinmap");
pub static HAS_TYPE_DESCRIPTION: FamilyInfo = FamilyInfo::root("has_type_description");
pub static HAS_DESIGNATOR: FamilyInfo = FamilyInfo::root("has_designator");
pub static HAS_DESIGNATOR_PREFIX: FamilyInfo = FamilyInfo::root("has_designator_prefix");
pub static HAS_OVERRIDDEN_NAME: FamilyInfo = FamilyInfo::root("has_overridden_name");
pub static HAS_PCB_POSITION: FamilyInfo = FamilyInfo::root("has_pcb_position");
pub static HAS_PCB_LAYOUT: FamilyInfo = FamilyInfo::root("has_pcb_layout");
pub static HAS_SINGLE_END_PARTNER: FamilyInfo = FamilyInfo::root("has_single_end_partner");

/// Series insertion points of a two-terminal module.
pub trait CanBridge {
    fn input(&self) -> NodeId;
    fn output(&self) -> NodeId;
}

pub trait HasFootprint {
    fn footprint(&self) -> NodeId;
}

pub trait HasKicadFootprint: HasFootprint {
    /// `Library:Footprint` identifier.
    fn kicad_footprint(&self) -> &str;
}

pub trait HasFootprintPinmap {
    /// Pin number to the `Electrical` interface it is wired to.
    fn pinmap(&self) -> &[(String, NodeId)];
}

pub trait HasTypeDescription {
    fn type_description(&self, graph: &Graph, owner: ObjectRef) -> String;
}

pub trait HasDesignator {
    fn designator(&self) -> &str;
}

pub trait HasDesignatorPrefix {
    fn prefix(&self) -> &str;
}

pub trait HasOverriddenName {
    fn name(&self) -> &str;
}

pub trait HasPcbPosition {
    fn position(&self) -> PcbPosition;
}

pub trait HasPcbLayout {
    /// Child paths relative to the owner, with their placements.
    fn placements(&self) -> &[(String, PcbPosition)];
}

pub trait HasSingleEndPartner {
    /// The end of the link opposite to `from`.
    fn partner(&self, from: InterfaceId) -> Option<InterfaceId>;
}

family!(CanBridge, CAN_BRIDGE);
family!(HasFootprint, HAS_FOOTPRINT);
family!(HasKicadFootprint, HAS_KICAD_FOOTPRINT);
family!(HasFootprintPinmap, HAS_FOOTPRINT_PINMAP);
family!(HasTypeDescription, HAS_TYPE_DESCRIPTION);
family!(HasDesignator, HAS_DESIGNATOR);
family!(HasDesignatorPrefix, HAS_DESIGNATOR_PREFIX);
family!(HasOverriddenName, HAS_OVERRIDDEN_NAME);
family!(HasPcbPosition, HAS_PCB_POSITION);
family!(HasPcbLayout, HAS_PCB_LAYOUT);
family!(HasSingleEndPartner, HAS_SINGLE_END_PARTNER);

// ============================================================================
// Placement values
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PcbLayer {
    Top,
    Bottom,
}

/// Board placement in millimetres and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PcbPosition {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub layer: PcbLayer,
}

impl PcbPosition {
    pub fn top(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            rotation: 0.0,
            layer: PcbLayer::Top,
        }
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees.rem_euclid(360.0);
        self
    }

    /// `self` interpreted relative to `origin`: the offset is turned
    /// counter-clockwise by the origin's rotation before it is added.
    pub fn relative_to(&self, origin: &PcbPosition) -> PcbPosition {
        let (sin, cos) = origin.rotation.to_radians().sin_cos();
        PcbPosition {
            x: origin.x + self.x * cos - self.y * sin,
            y: origin.y + self.x * sin + self.y * cos,
            rotation: (origin.rotation + self.rotation).rem_euclid(360.0),
            layer: self.layer,
        }
    }
}

// ============================================================================
// Stock implementations
// ============================================================================

#[derive(Debug, Clone)]
pub struct CanBridgeDefined {
    pub input: NodeId,
    pub output: NodeId,
}

impl CanBridge for CanBridgeDefined {
    fn input(&self) -> NodeId {
        self.input
    }
    fn output(&self) -> NodeId {
        self.output
    }
}

always_implemented!(CanBridgeDefined, CAN_BRIDGE => CanBridge);

#[derive(Debug, Clone)]
pub struct HasFootprintDefined(pub NodeId);

impl HasFootprint for HasFootprintDefined {
    fn footprint(&self) -> NodeId {
        self.0
    }
}

always_implemented!(HasFootprintDefined, HAS_FOOTPRINT => HasFootprint);

#[derive(Debug, Clone)]
pub struct HasKicadFootprintDefined {
    pub footprint: NodeId,
    pub name: String,
}

impl HasFootprint for HasKicadFootprintDefined {
    fn footprint(&self) -> NodeId {
        self.footprint
    }
}

impl HasKicadFootprint for HasKicadFootprintDefined {
    fn kicad_footprint(&self) -> &str {
        &self.name
    }
}

always_implemented!(HasKicadFootprintDefined, HAS_KICAD_FOOTPRINT => HasFootprint, HasKicadFootprint);

#[derive(Debug, Clone)]
pub struct HasFootprintPinmapDefined(pub Vec<(String, NodeId)>);

impl HasFootprintPinmap for HasFootprintPinmapDefined {
    fn pinmap(&self) -> &[(String, NodeId)] {
        &self.0
    }
}

always_implemented!(HasFootprintPinmapDefined, HAS_FOOTPRINT_PINMAP => HasFootprintPinmap);

#[derive(Debug, Clone)]
pub struct HasTypeDescriptionDefined(pub String);

impl HasTypeDescription for HasTypeDescriptionDefined {
    fn type_description(&self, _graph: &Graph, _owner: ObjectRef) -> String {
        self.0.clone()
    }
}

always_implemented!(HasTypeDescriptionDefined, HAS_TYPE_DESCRIPTION => HasTypeDescription);

/// Description built from the owner's parameters, e.g. `10kΩ`.
///
/// Only implemented once every listed parameter is a constant.
#[derive(Debug, Clone)]
pub struct TypeDescriptionFromParameters {
    /// Parameter name and unit symbol.
    pub parameters: Vec<(&'static str, &'static str)>,
}

impl TypeDescriptionFromParameters {
    pub fn new(parameters: &[(&'static str, &'static str)]) -> Self {
        Self {
            parameters: parameters.to_vec(),
        }
    }

    fn constants(&self, graph: &Graph, owner: ObjectRef) -> Option<Vec<f64>> {
        let node = owner.as_node()?;
        self.parameters
            .iter()
            .map(|(name, _)| graph.parameter(node, name).ok()?.as_constant())
            .collect()
    }
}

impl HasTypeDescription for TypeDescriptionFromParameters {
    fn type_description(&self, graph: &Graph, owner: ObjectRef) -> String {
        let values = self.constants(graph, owner).unwrap_or_default();
        values
            .iter()
            .zip(&self.parameters)
            .map(|(value, (_, unit))| format_si(*value, unit))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

provides!(TypeDescriptionFromParameters => HasTypeDescription);

impl TraitImpl for TypeDescriptionFromParameters {
    fn family(&self) -> &'static FamilyInfo {
        &HAS_TYPE_DESCRIPTION
    }

    fn casts(&self) -> Casts {
        Casts::new().with::<dyn HasTypeDescription, Self>()
    }

    fn is_implemented(&self, graph: &Graph, owner: ObjectRef) -> bool {
        self.constants(graph, owner).is_some()
    }
}

#[derive(Debug, Clone)]
pub struct HasDesignatorDefined(pub String);

impl HasDesignator for HasDesignatorDefined {
    fn designator(&self) -> &str {
        &self.0
    }
}

always_implemented!(HasDesignatorDefined, HAS_DESIGNATOR => HasDesignator);

#[derive(Debug, Clone)]
pub struct HasDesignatorPrefixDefined(pub &'static str);

impl HasDesignatorPrefix for HasDesignatorPrefixDefined {
    fn prefix(&self) -> &str {
        self.0
    }
}

always_implemented!(HasDesignatorPrefixDefined, HAS_DESIGNATOR_PREFIX => HasDesignatorPrefix);

#[derive(Debug, Clone)]
pub struct HasOverriddenNameDefined(pub String);

impl HasOverriddenName for HasOverriddenNameDefined {
    fn name(&self) -> &str {
        &self.0
    }
}

always_implemented!(HasOverriddenNameDefined, HAS_OVERRIDDEN_NAME => HasOverriddenName);

#[derive(Debug, Clone)]
pub struct HasPcbPositionDefined(pub PcbPosition);

impl HasPcbPosition for HasPcbPositionDefined {
    fn position(&self) -> PcbPosition {
        self.0
    }
}

always_implemented!(HasPcbPositionDefined, HAS_PCB_POSITION => HasPcbPosition);

#[derive(Debug, Clone, Default)]
pub struct HasPcbLayoutDefined(pub Vec<(String, PcbPosition)>);

impl HasPcbLayout for HasPcbLayoutDefined {
    fn placements(&self) -> &[(String, PcbPosition)] {
        &self.0
    }
}

always_implemented!(HasPcbLayoutDefined, HAS_PCB_LAYOUT => HasPcbLayout);

/// Attached to two-ended direct links so traversals can step across them.
#[derive(Debug, Clone)]
pub struct SingleEndPartner {
    ends: [InterfaceId; 2],
}

impl SingleEndPartner {
    pub fn new(a: InterfaceId, b: InterfaceId) -> Self {
        Self { ends: [a, b] }
    }
}

impl HasSingleEndPartner for SingleEndPartner {
    fn partner(&self, from: InterfaceId) -> Option<InterfaceId> {
        match self.ends {
            [a, b] if a == from => Some(b),
            [a, b] if b == from => Some(a),
            _ => None,
        }
    }
}

always_implemented!(SingleEndPartner, HAS_SINGLE_END_PARTNER => HasSingleEndPartner);

// ============================================================================
// Formatting
// ============================================================================

const SI_PREFIXES: [(f64, &str); 9] = [
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "k"),
    (1.0, ""),
    (1e-3, "m"),
    (1e-6, "µ"),
    (1e-9, "n"),
    (1e-12, "p"),
    (1e-15, "f"),
];

/// Engineering notation with an SI prefix, e.g. `4700.0, "Ω"` -> `4.7kΩ`.
pub fn format_si(value: f64, unit: &str) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}{unit}");
    }
    let magnitude = value.abs();
    let (scale, prefix) = SI_PREFIXES
        .iter()
        .find(|(scale, _)| magnitude >= *scale * 0.999_999)
        .copied()
        .unwrap_or(SI_PREFIXES[SI_PREFIXES.len() - 1]);
    let scaled = (value / scale * 1e6).round() / 1e6;
    format!("{scaled}{prefix}{unit}")
}

/// Text used for a parameter in listings.
pub fn describe_parameter(parameter: &Parameter, unit: &str) -> String {
    match parameter {
        Parameter::Constant(v) => format_si(*v, unit),
        Parameter::Range { min, max } => format!("{}..{}", format_si(*min, unit), format_si(*max, unit)),
        other => other.to_string(),
    }
}
