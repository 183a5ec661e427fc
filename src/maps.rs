//! Map catalog: per-map bias level and attacking faction
//!
//! The catalog is the live, editable classification. Weeks copy it when they
//! are created so later edits never change the meaning of recorded weeks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{BiasLevel, Faction, MapId, MapInfo};

/// Map name to classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapCatalog {
    maps: BTreeMap<MapId, MapInfo>,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the stock War of Rights maps
    pub fn war_of_rights() -> Self {
        let mut catalog = Self::new();
        for (name, code) in DEFAULT_BIASES {
            let attacker = if UNION_ATTACK_MAPS.contains(name) {
                Faction::Union
            } else {
                Faction::Confederate
            };
            let bias = BiasLevel::from_code(*code).unwrap_or_default();
            catalog.insert(*name, MapInfo { bias, attacker });
        }
        catalog
    }

    pub fn insert(&mut self, name: impl Into<MapId>, info: MapInfo) {
        self.maps.insert(name.into(), info);
    }

    /// Change the bias of a map, adding it as a Confederate attack when unknown
    pub fn set_bias(&mut self, name: &str, bias: BiasLevel) {
        self.maps
            .entry(name.to_string())
            .and_modify(|info| info.bias = bias)
            .or_insert(MapInfo {
                bias,
                attacker: Faction::Confederate,
            });
    }

    pub fn get(&self, name: &str) -> Option<&MapInfo> {
        self.maps.get(name)
    }

    pub fn bias(&self, name: &str) -> BiasLevel {
        self.get(name).map(|info| info.bias).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<MapId> {
        self.maps.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Copy stored on a week at creation time
    pub fn snapshot(&self) -> BTreeMap<MapId, MapInfo> {
        self.maps.clone()
    }
}

const DEFAULT_BIASES: &[(&str, f64)] = &[
    // Antietam
    ("East Woods Skirmish", 2.0),
    ("Hooker's Push", 2.5),
    ("Hagerstown Turnpike", 1.0),
    ("Miller's Cornfield", 1.5),
    ("East Woods", 2.5),
    ("Nicodemus Hill", 2.5),
    ("Bloody Lane", 1.5),
    ("Pry Ford", 2.0),
    ("Pry Grist Mill", 1.0),
    ("Pry House", 1.5),
    ("West Woods", 1.5),
    ("Dunker Church", 1.5),
    ("Burnside's Bridge", 2.5),
    ("Cooke's Countercharge", 1.5),
    ("Otto and Sherrick Farms", 1.0),
    ("Roulette Lane", 1.5),
    ("Piper Farm", 2.0),
    ("Hill's Counterattack", 1.0),
    // Harpers Ferry
    ("Maryland Heights", 1.5),
    ("River Crossing", 2.5),
    ("Downtown", 1.0),
    ("School House Ridge", 1.0),
    ("Bolivar Heights Camp", 1.5),
    ("High Street", 1.0),
    ("Shenandoah Street", 1.5),
    ("Harpers Ferry Graveyard", 1.0),
    ("Washington Street", 1.0),
    ("Bolivar Heights Redoubt", 2.0),
    // South Mountain
    ("Garland's Stand", 2.5),
    ("Cox's Push", 2.5),
    ("Hatch's Attack", 2.0),
    ("Anderson's Counterattack", 1.0),
    ("Reno's Fall", 1.5),
    ("Colquitt's Defense", 2.0),
    // Drill Camp
    ("Alexander Farm", 2.0),
    ("Crossroads", 0.0),
    ("Smith Field", 1.0),
    ("Crecy's Cornfield", 1.5),
    ("Crossley Creek", 1.0),
    ("Larsen Homestead", 1.5),
    ("South Woodlot", 1.5),
    ("Flemming's Meadow", 2.0),
    ("Wagon Road", 2.0),
    ("Union Camp", 1.5),
    ("Pat's Turnpike", 1.5),
    ("Stefan's Lot", 1.0),
    ("Confederate Encampment", 2.0),
];

const UNION_ATTACK_MAPS: &[&str] = &[
    "East Woods Skirmish",
    "Nicodemus Hill",
    "Hooker's Push",
    "Bloody Lane",
    "Pry Ford",
    "Smith Field",
    "Alexander Farm",
    "Crossroads",
    "Wagon Road",
    "Hagerstown Turnpike",
    "Pry Grist Mill",
    "Otto and Sherrick Farms",
    "Piper Farm",
    "West Woods",
    "Dunker Church",
    "Burnside's Bridge",
    "Garland's Stand",
    "Cox's Push",
    "Hatch's Attack",
    "Colquitt's Defense",
    "Flemming's Meadow",
    "Crossley Creek",
    "Confederate Encampment",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_contents() {
        let catalog = MapCatalog::war_of_rights();
        assert_eq!(catalog.len(), 47);

        let bloody_lane = catalog.get("Bloody Lane").unwrap();
        assert_eq!(bloody_lane.bias, BiasLevel::HeavyAttacker);
        assert_eq!(bloody_lane.attacker, Faction::Union);

        let downtown = catalog.get("Downtown").unwrap();
        assert_eq!(downtown.attacker, Faction::Confederate);
        assert_eq!(catalog.bias("Crossroads"), BiasLevel::Balanced);
    }

    #[test]
    fn test_every_union_attack_map_is_catalogued() {
        let catalog = MapCatalog::war_of_rights();
        for name in UNION_ATTACK_MAPS {
            assert_eq!(catalog.get(name).map(|m| m.attacker), Some(Faction::Union));
        }
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut catalog = MapCatalog::war_of_rights();
        let snapshot = catalog.snapshot();
        catalog.set_bias("Bloody Lane", BiasLevel::Balanced);

        assert_eq!(snapshot["Bloody Lane"].bias, BiasLevel::HeavyAttacker);
        assert_eq!(catalog.bias("Bloody Lane"), BiasLevel::Balanced);
    }

    #[test]
    fn test_set_bias_on_unknown_map() {
        let mut catalog = MapCatalog::new();
        catalog.set_bias("New Field", BiasLevel::LightDefender);
        let info = catalog.get("New Field").unwrap();
        assert_eq!(info.bias, BiasLevel::LightDefender);
        assert_eq!(info.attacker, Faction::Confederate);
    }
}
