use hashbrown::HashMap;

use crate::universe::SimulatedUniverse;

pub type UniverseId = u32;

/// In-memory universe store.
///
/// Ids are handed out once and never reused, so a deleted universe's id
/// stays dangling rather than silently pointing at a newer one. The
/// registry itself is single-threaded; the daemon serializes access by
/// holding it inside its locked state.
#[derive(Debug, Default)]
pub struct UniverseRegistry {
    universes: HashMap<UniverseId, SimulatedUniverse>,
    next_id: UniverseId,
}

impl UniverseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, universe: SimulatedUniverse) -> UniverseId {
        let id = self.next_id;
        self.next_id += 1;
        self.universes.insert(id, universe);
        id
    }

    pub fn get(&self, id: UniverseId) -> Option<&SimulatedUniverse> {
        self.universes.get(&id)
    }

    pub fn remove(&mut self, id: UniverseId) -> bool {
        self.universes.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.universes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universes.is_empty()
    }

    /// All universes in creation order (ascending id).
    pub fn all(&self) -> Vec<(UniverseId, &SimulatedUniverse)> {
        let mut entries: Vec<_> = self.universes.iter().map(|(&id, u)| (id, u)).collect();
        entries.sort_by_key(|&(id, _)| id);
        entries
    }

    /// Case-insensitive name substring search, in creation order.
    pub fn search(&self, term: &str) -> Vec<(UniverseId, &SimulatedUniverse)> {
        let needle = term.to_lowercase();
        self.all()
            .into_iter()
            .filter(|(_, u)| u.name().to_lowercase().contains(&needle))
            .collect()
    }

    #[cfg(feature = "serde")]
    pub fn export_json(&self, id: UniverseId) -> Option<String> {
        let universe = self.get(id)?;
        serde_json::to_string_pretty(&universe.to_json()).ok()
    }

    pub fn export_csv(&self, id: UniverseId) -> Option<String> {
        self.get(id).map(SimulatedUniverse::to_csv)
    }

    #[cfg(feature = "serde")]
    pub fn export_all_json(&self) -> String {
        let universes: Vec<_> = self.all().into_iter().map(|(_, u)| u.to_json()).collect();
        serde_json::to_string_pretty(&serde_json::json!({ "universes": universes }))
            .unwrap_or_else(|_| "{\"universes\":[]}".to_string())
    }

    pub fn export_all_csv(&self) -> String {
        let mut out = String::new();
        for (_, universe) in self.all() {
            out.push_str(&universe.to_csv());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::UniverseParameters;

    fn named(name: &str) -> SimulatedUniverse {
        SimulatedUniverse::with_created_at(name, UniverseParameters::default(), 0)
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let mut reg = UniverseRegistry::new();
        assert_eq!(reg.add(named("a")), 0);
        assert_eq!(reg.add(named("b")), 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn ids_are_never_reused_after_removal() {
        let mut reg = UniverseRegistry::new();
        let a = reg.add(named("a"));
        let b = reg.add(named("b"));

        assert!(reg.remove(a));
        assert!(reg.get(a).is_none(), "removed id must dangle");
        assert!(reg.get(b).is_some());

        let c = reg.add(named("c"));
        assert_eq!(c, 2, "fresh id even after a removal");
    }

    #[test]
    fn remove_of_unknown_id_is_a_noop() {
        let mut reg = UniverseRegistry::new();
        assert!(!reg.remove(17));
        reg.add(named("a"));
        assert!(!reg.remove(17));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn all_lists_in_creation_order() {
        let mut reg = UniverseRegistry::new();
        reg.add(named("first"));
        reg.add(named("second"));
        reg.add(named("third"));
        reg.remove(1);

        let names: Vec<_> = reg.all().iter().map(|(_, u)| u.name()).collect();
        assert_eq!(names, vec!["first", "third"]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut reg = UniverseRegistry::new();
        reg.add(named("Milky Way Prime"));
        reg.add(named("Phantom Test"));
        reg.add(named("milky dwarf"));

        let hits: Vec<_> = reg.search("MILKY").iter().map(|(id, _)| *id).collect();
        assert_eq!(hits, vec![0, 2]);
        assert!(reg.search("nebula").is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn export_json_round_trips_known_ids_only() {
        let mut reg = UniverseRegistry::new();
        let id = reg.add(named("exportable"));

        let json = reg.export_json(id).unwrap();
        assert!(json.contains("\"exportable\""));
        assert!(reg.export_json(99).is_none());
    }

    #[test]
    fn export_csv_covers_every_universe() {
        let mut reg = UniverseRegistry::new();
        reg.add(named("one"));
        reg.add(named("two"));

        let csv = reg.export_all_csv();
        assert!(csv.contains("one,"));
        assert!(csv.contains("two,"));
    }
}
