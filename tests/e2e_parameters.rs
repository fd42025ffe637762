//! End-to-end tests for parameter resolution, standalone and through the
//! graph (node parameters and connect hooks).

use circuit_graph::library::{ELECTRIC_LOGIC, ELECTRIC_POWER, RESISTOR};
use circuit_graph::model::resolve_all;
use circuit_graph::{Error, Graph, Parameter, ResolutionError};
use pretty_assertions::assert_eq;

fn range(min: f64, max: f64) -> Parameter {
    Parameter::Range { min, max }
}

// ============================================================================
// 1. Resolution laws
// ============================================================================

#[test]
fn test_tbd_is_identity() {
    for p in [
        Parameter::Tbd,
        Parameter::Constant(5.0),
        range(1.0, 10.0),
        Parameter::set([1.0, 2.0]),
    ] {
        assert_eq!(Parameter::Tbd.resolve(&p).unwrap(), p);
        assert_eq!(p.resolve(&Parameter::Tbd).unwrap(), p);
    }
}

#[test]
fn test_constants() {
    let five = Parameter::Constant(5.0);
    assert_eq!(five.resolve(&Parameter::Constant(5.0)).unwrap(), five);
    assert_eq!(
        five.resolve(&Parameter::Constant(6.0)).unwrap_err(),
        ResolutionError::ConflictingConstants(5.0, 6.0)
    );
}

#[test]
fn test_constant_against_range() {
    assert_eq!(
        Parameter::Constant(5.0).resolve(&range(1.0, 10.0)).unwrap(),
        Parameter::Constant(5.0)
    );
    assert!(matches!(
        Parameter::Constant(11.0).resolve(&range(1.0, 10.0)),
        Err(ResolutionError::ConstantNotInRange { .. })
    ));
    assert_eq!(
        range(1.0, 10.0).resolve(&Parameter::Constant(1.0)).unwrap(),
        Parameter::Constant(1.0)
    );
}

#[test]
fn test_overlapping_ranges_take_union_bounds() {
    assert_eq!(range(1.0, 5.0).resolve(&range(3.0, 10.0)).unwrap(), range(1.0, 10.0));
    assert_eq!(range(3.0, 10.0).resolve(&range(1.0, 5.0)).unwrap(), range(1.0, 10.0));
    assert!(matches!(
        range(1.0, 2.0).resolve(&range(3.0, 4.0)),
        Err(ResolutionError::ConflictingRanges(..))
    ));
}

#[test]
fn test_sets_narrow() {
    let e12 = Parameter::set([1.0, 1.2, 1.5, 1.8, 2.2, 2.7]);
    assert_eq!(e12.resolve(&range(1.4, 2.0)).unwrap(), Parameter::set([1.5, 1.8]));
    assert_eq!(e12.resolve(&range(2.5, 3.0)).unwrap(), Parameter::Constant(2.7));
    assert_eq!(
        e12.resolve(&Parameter::set([9.0])).unwrap_err(),
        ResolutionError::EmptySet
    );
    assert!(matches!(
        e12.resolve(&Parameter::Constant(2.0)),
        Err(ResolutionError::ConstantNotInSet(_))
    ));
}

#[test]
fn test_resolve_all_folds_from_tbd() {
    let merged = resolve_all(&[range(0.0, 5.0), Parameter::Tbd, Parameter::Constant(3.3)]).unwrap();
    assert_eq!(merged, Parameter::Constant(3.3));
    assert_eq!(resolve_all(std::iter::empty()).unwrap(), Parameter::Tbd);
}

#[test]
fn test_constructors() {
    assert!(matches!(
        Parameter::range(2.0, 1.0),
        Err(ResolutionError::InvalidRange { .. })
    ));
    assert_eq!(Parameter::from_center(100.0, 0.05), range(95.0, 105.0));
    assert_eq!(Parameter::set([2.0, 1.0, 2.0]), Parameter::Set(vec![1.0, 2.0]));
}

// ============================================================================
// 2. Parameters on nodes
// ============================================================================

#[test]
fn test_unset_parameter_is_tbd() {
    let mut g = Graph::new();
    let r = g.create(&RESISTOR).unwrap();
    assert_eq!(g.parameter(r, "resistance").unwrap(), Parameter::Tbd);
    assert_eq!(g.parameter(r, "tolerance").unwrap(), Parameter::Tbd);
}

#[test]
fn test_merge_keeps_value_on_conflict() {
    let mut g = Graph::new();
    let r = g.create(&RESISTOR).unwrap();
    g.merge_parameter(r, "resistance", &Parameter::from_center(10_000.0, 0.01))
        .unwrap();
    g.merge_parameter(r, "resistance", &Parameter::Constant(10_000.0))
        .unwrap();

    let err = g
        .merge_parameter(r, "resistance", &Parameter::Constant(4_700.0))
        .unwrap_err();
    assert!(matches!(err, Error::Resolution(ResolutionError::ConflictingConstants(..))));
    assert_eq!(g.parameter(r, "resistance").unwrap(), Parameter::Constant(10_000.0));
}

// ============================================================================
// 3. Connect hooks merge rail voltages
// ============================================================================

#[test]
fn test_rail_voltage_spreads_over_connections() {
    let mut g = Graph::new();
    let rails: Vec<_> = (0..3).map(|_| g.create(&ELECTRIC_POWER).unwrap()).collect();
    g.set_parameter(rails[0], "voltage", range(3.0, 3.6)).unwrap();
    g.set_parameter(rails[2], "voltage", 3.3).unwrap();

    g.connect(rails[0], rails[1]).unwrap();
    assert_eq!(g.parameter(rails[1], "voltage").unwrap(), range(3.0, 3.6));

    g.connect(rails[1], rails[2]).unwrap();
    for rail in &rails {
        assert_eq!(g.parameter(*rail, "voltage").unwrap(), Parameter::Constant(3.3));
    }
}

#[test]
fn test_logic_reference_rails_resolve() {
    let mut g = Graph::new();
    let a = g.create(&ELECTRIC_LOGIC).unwrap();
    let b = g.create(&ELECTRIC_LOGIC).unwrap();
    let (ref_a, ref_b) = (
        g.child(a, "reference").unwrap(),
        g.child(b, "reference").unwrap(),
    );
    g.set_parameter(ref_a, "voltage", 1.8).unwrap();

    g.connect(a, b).unwrap();
    assert_eq!(g.parameter(ref_b, "voltage").unwrap(), Parameter::Constant(1.8));
}
