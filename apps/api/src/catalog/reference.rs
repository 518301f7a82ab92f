//! Static reference lists offered to the presentation layer when configuring a run.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReferenceItem {
    pub id: &'static str,
    pub name: &'static str,
}

const fn item(id: &'static str, name: &'static str) -> ReferenceItem {
    ReferenceItem { id, name }
}

/// IT-related specializations understood by the catalog.
pub const SPECIALIZATIONS: &[ReferenceItem] = &[
    item("1", "Information technology"),
    item("1.221", "Software development"),
    item("1.3", "Testing"),
    item("1.9", "System administration"),
    item("1.10", "Networks and telecom"),
    item("1.25", "Data science"),
    item("1.82", "DevOps"),
    item("1.110", "Machine learning"),
    item("1.113", "Information security"),
    item("1.117", "Technical support"),
    item("1.200", "Project management"),
    item("1.211", "Analytics"),
    item("1.272", "Artificial intelligence"),
    item("1.327", "CTO, VP"),
    item("1.400", "Product management"),
    item("1.420", "Interface design"),
    item("1.474", "Robotics"),
    item("1.536", "Technical writing"),
];

/// Major cities (catalog area identifiers).
pub const CITIES: &[ReferenceItem] = &[
    item("1", "Moscow"),
    item("2", "Saint Petersburg"),
    item("3", "Yekaterinburg"),
    item("4", "Novosibirsk"),
    item("41", "Kaliningrad"),
    item("54", "Krasnoyarsk"),
    item("66", "Nizhny Novgorod"),
    item("88", "Kazan"),
    item("104", "Voronezh"),
    item("113", "Rostov-on-Don"),
    item("159", "Samara"),
    item("1438", "Krasnodar"),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_reference_ids_are_unique() {
        for list in [SPECIALIZATIONS, CITIES] {
            let ids: HashSet<_> = list.iter().map(|i| i.id).collect();
            assert_eq!(ids.len(), list.len());
        }
    }

    #[test]
    fn test_reference_item_serializes_id_and_name() {
        let json = serde_json::to_value(CITIES[0]).unwrap();
        assert_eq!(json, serde_json::json!({"id": "1", "name": "Moscow"}));
    }
}
