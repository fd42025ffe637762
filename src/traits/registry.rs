//! Per-object trait slots.

use std::fmt;

use super::{Casts, Family, FamilyInfo, TraitImpl};

/// One attached implementation with its cast table.
pub struct TraitEntry {
    imp: Box<dyn TraitImpl>,
    casts: Casts,
}

impl TraitEntry {
    pub fn new(imp: Box<dyn TraitImpl>) -> Self {
        let casts = imp.casts();
        Self { imp, casts }
    }

    pub fn family(&self) -> &'static FamilyInfo {
        self.imp.family()
    }

    pub fn implementation(&self) -> &dyn TraitImpl {
        self.imp.as_ref()
    }

    /// Whether this entry answers lookups for `family`.
    pub fn serves(&self, family: &FamilyInfo) -> bool {
        self.family().is_subfamily_of(family)
    }

    /// View the implementation as capability `F`.
    pub fn cast<F: Family + ?Sized>(&self) -> Option<&F> {
        self.casts.cast::<F>(self.imp.as_any())
    }

    pub fn into_inner(self) -> Box<dyn TraitImpl> {
        self.imp
    }
}

impl fmt::Debug for TraitEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraitEntry")
            .field("family", &self.family().name)
            .field("imp", &self.imp)
            .finish()
    }
}

/// What happened to an implementation handed to [`TraitRegistry::attach`].
#[derive(Debug)]
pub enum AttachOutcome {
    /// No comparable family was attached; the implementation was added.
    Appended,
    /// A comparable, no more specific implementation was swapped out.
    Replaced(Box<dyn TraitImpl>),
    /// A strictly more specific implementation is already attached; the
    /// new one is handed back untouched.
    Rejected(Box<dyn TraitImpl>),
}

impl AttachOutcome {
    pub fn is_attached(&self) -> bool {
        !matches!(self, AttachOutcome::Rejected(_))
    }
}

/// Ordered trait slots of one node, interface or link.
#[derive(Debug, Default)]
pub struct TraitRegistry {
    entries: Vec<TraitEntry>,
}

impl TraitRegistry {
    /// Attach `imp`, resolving against the first comparable entry.
    ///
    /// An implementation of the same or a more specific family takes the
    /// slot of the comparable entry. One of a strictly more general family
    /// is rejected.
    pub fn attach(&mut self, imp: Box<dyn TraitImpl>) -> AttachOutcome {
        let family = imp.family();
        let slot = self
            .entries
            .iter()
            .position(|entry| entry.family().is_comparable(family));

        match slot {
            None => {
                self.entries.push(TraitEntry::new(imp));
                AttachOutcome::Appended
            }
            Some(index) if family.is_subfamily_of(self.entries[index].family()) => {
                let previous = std::mem::replace(&mut self.entries[index], TraitEntry::new(imp));
                AttachOutcome::Replaced(previous.into_inner())
            }
            Some(_) => AttachOutcome::Rejected(imp),
        }
    }

    /// Entries answering lookups for `family`, in attachment order.
    pub fn matching<'a>(&'a self, family: &'a FamilyInfo) -> impl Iterator<Item = &'a TraitEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.serves(family))
    }

    /// Whether any attached family is comparable to `family`.
    pub fn has_comparable(&self, family: &FamilyInfo) -> bool {
        self.entries.iter().any(|entry| entry.family().is_comparable(family))
    }

    /// Detach the first entry answering lookups for `family`.
    pub fn remove(&mut self, family: &FamilyInfo) -> Option<Box<dyn TraitImpl>> {
        let index = self.entries.iter().position(|entry| entry.serves(family))?;
        Some(self.entries.remove(index).into_inner())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provides;

    trait Footprinted {
        fn footprint(&self) -> String;
    }
    trait KicadFootprinted: Footprinted {
        fn library(&self) -> String;
    }
    trait Labelled {
        fn label(&self) -> String;
    }

    static FOOTPRINTED: FamilyInfo = FamilyInfo::root("footprinted");
    static KICAD_FOOTPRINTED: FamilyInfo = FamilyInfo::child("kicad_footprinted", &FOOTPRINTED);
    static LABELLED: FamilyInfo = FamilyInfo::root("labelled");

    impl Family for dyn Footprinted {
        fn info() -> &'static FamilyInfo {
            &FOOTPRINTED
        }
    }
    impl Family for dyn KicadFootprinted {
        fn info() -> &'static FamilyInfo {
            &KICAD_FOOTPRINTED
        }
    }
    impl Family for dyn Labelled {
        fn info() -> &'static FamilyInfo {
            &LABELLED
        }
    }

    #[derive(Debug, Clone)]
    struct Generic(&'static str);

    impl Footprinted for Generic {
        fn footprint(&self) -> String {
            self.0.into()
        }
    }
    provides!(Generic => Footprinted);
    impl TraitImpl for Generic {
        fn family(&self) -> &'static FamilyInfo {
            &FOOTPRINTED
        }
        fn casts(&self) -> Casts {
            Casts::new().with::<dyn Footprinted, Self>()
        }
    }

    #[derive(Debug, Clone)]
    struct Kicad(&'static str);

    impl Footprinted for Kicad {
        fn footprint(&self) -> String {
            format!("kicad:{}", self.0)
        }
    }
    impl KicadFootprinted for Kicad {
        fn library(&self) -> String {
            "Resistor_SMD".into()
        }
    }
    provides!(Kicad => Footprinted, KicadFootprinted);
    impl TraitImpl for Kicad {
        fn family(&self) -> &'static FamilyInfo {
            &KICAD_FOOTPRINTED
        }
        fn casts(&self) -> Casts {
            Casts::new()
                .with::<dyn Footprinted, Self>()
                .with::<dyn KicadFootprinted, Self>()
        }
    }

    #[derive(Debug, Clone)]
    struct Label;

    impl Labelled for Label {
        fn label(&self) -> String {
            "R1".into()
        }
    }
    provides!(Label => Labelled);
    impl TraitImpl for Label {
        fn family(&self) -> &'static FamilyInfo {
            &LABELLED
        }
        fn casts(&self) -> Casts {
            Casts::new().with::<dyn Labelled, Self>()
        }
    }

    fn footprint_of(registry: &TraitRegistry) -> Vec<String> {
        registry
            .matching(&FOOTPRINTED)
            .filter_map(|e| e.cast::<dyn Footprinted>())
            .map(|f| f.footprint())
            .collect()
    }

    #[test]
    fn test_unrelated_families_append() {
        let mut registry = TraitRegistry::default();
        assert!(matches!(registry.attach(Box::new(Generic("0402"))), AttachOutcome::Appended));
        assert!(matches!(registry.attach(Box::new(Label)), AttachOutcome::Appended));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_specific_replaces_general() {
        let mut registry = TraitRegistry::default();
        registry.attach(Box::new(Generic("0402")));
        let outcome = registry.attach(Box::new(Kicad("R_0402")));

        match outcome {
            AttachOutcome::Replaced(previous) => assert!(previous.is::<Generic>()),
            other => panic!("expected replacement, got {other:?}"),
        }
        assert_eq!(registry.len(), 1);
        assert_eq!(footprint_of(&registry), vec!["kicad:R_0402".to_string()]);
    }

    #[test]
    fn test_general_rejected_after_specific() {
        let mut registry = TraitRegistry::default();
        registry.attach(Box::new(Kicad("R_0402")));
        let outcome = registry.attach(Box::new(Generic("0402")));

        assert!(!outcome.is_attached());
        assert_eq!(footprint_of(&registry), vec!["kicad:R_0402".to_string()]);
    }

    #[test]
    fn test_same_family_last_wins() {
        let mut registry = TraitRegistry::default();
        registry.attach(Box::new(Generic("0402")));
        registry.attach(Box::new(Generic("0603")));
        assert_eq!(footprint_of(&registry), vec!["0603".to_string()]);
    }

    #[test]
    fn test_lookup_sees_subfamilies() {
        let mut registry = TraitRegistry::default();
        registry.attach(Box::new(Kicad("R_0402")));
        assert_eq!(registry.matching(&FOOTPRINTED).count(), 1);
        assert_eq!(registry.matching(&KICAD_FOOTPRINTED).count(), 1);
        assert_eq!(registry.matching(&LABELLED).count(), 0);
        assert!(registry.has_comparable(&FOOTPRINTED));
    }

    #[test]
    fn test_remove_first_match() {
        let mut registry = TraitRegistry::default();
        registry.attach(Box::new(Label));
        registry.attach(Box::new(Kicad("R_0402")));

        let removed = registry.remove(&FOOTPRINTED).unwrap();
        assert!(removed.is::<Kicad>());
        assert!(registry.remove(&FOOTPRINTED).is_none());
        assert_eq!(registry.len(), 1);
    }
}
