//! The fixed litter taxonomy.
//!
//! Severity is a 1-10 hazard rating per category, independent of any single
//! detection instance. The table is built once and passed explicitly; it is
//! never mutated at runtime.

use serde::Serialize;

/// One litter category: its hazard rating, the phrase variants tested
/// against the similarity oracle, and the color used when drawing its
/// boxes.
#[derive(Debug, Clone, Serialize)]
pub struct LitterCategory {
    pub name: &'static str,
    pub severity: u8,
    pub description: &'static str,
    #[serde(skip)]
    pub phrases: &'static [&'static str],
    #[serde(skip)]
    pub color: [u8; 4],
}

pub fn litter_taxonomy() -> &'static [LitterCategory] {
    TAXONOMY
}

static TAXONOMY: &[LitterCategory] = &[
    LitterCategory {
        name: "plastic_bottles",
        severity: 6,
        description: "Plastic bottles",
        phrases: &[
            "plastic water bottles on beach",
            "plastic soda bottles in sand",
        ],
        color: [255, 68, 68, 255],
    },
    LitterCategory {
        name: "plastic_bags",
        severity: 7,
        description: "Plastic bags",
        phrases: &[
            "plastic shopping bags on beach",
            "plastic bags blowing in wind",
        ],
        color: [255, 107, 107, 255],
    },
    LitterCategory {
        name: "cigarette_butts",
        severity: 4,
        description: "Cigarette butts",
        phrases: &["cigarette butts in sand", "cigarette filters on beach"],
        color: [255, 165, 0, 255],
    },
    LitterCategory {
        name: "food_containers",
        severity: 5,
        description: "Food containers and packaging",
        phrases: &["takeaway containers on beach", "food packaging waste"],
        color: [255, 215, 0, 255],
    },
    LitterCategory {
        name: "cans_bottles",
        severity: 5,
        description: "Cans and glass bottles",
        phrases: &["aluminum cans on beach", "glass bottles in sand"],
        color: [50, 205, 50, 255],
    },
    LitterCategory {
        name: "fishing_debris",
        severity: 8,
        description: "Fishing equipment and nets",
        phrases: &["fishing nets on beach", "fishing lines and hooks"],
        color: [138, 43, 226, 255],
    },
    LitterCategory {
        name: "large_debris",
        severity: 9,
        description: "Large debris items",
        phrases: &[
            "large pieces of trash",
            "furniture or appliances on beach",
        ],
        color: [220, 20, 60, 255],
    },
    LitterCategory {
        name: "microplastics",
        severity: 6,
        description: "Microplastics and fragments",
        phrases: &["small plastic fragments", "tiny plastic pieces in sand"],
        color: [255, 105, 180, 255],
    },
    LitterCategory {
        name: "paper_cardboard",
        severity: 3,
        description: "Paper and cardboard waste",
        phrases: &[
            "paper litter on beach",
            "cardboard boxes and packaging",
        ],
        color: [135, 206, 235, 255],
    },
    LitterCategory {
        name: "chemical_containers",
        severity: 10,
        description: "Chemical or hazardous containers",
        phrases: &[
            "chemical containers on beach",
            "hazardous waste containers",
        ],
        color: [178, 34, 34, 255],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_taxonomy_severities_in_range() {
        for category in litter_taxonomy() {
            assert!(
                (1..=10).contains(&category.severity),
                "{} has severity {}",
                category.name,
                category.severity
            );
        }
    }

    #[test]
    fn test_taxonomy_has_phrase_variants() {
        for category in litter_taxonomy() {
            assert!(!category.phrases.is_empty(), "{} has no phrases", category.name);
        }
    }

    #[test]
    fn test_taxonomy_names_unique() {
        let names: HashSet<&str> = litter_taxonomy().iter().map(|c| c.name).collect();
        assert_eq!(names.len(), litter_taxonomy().len());
    }

    #[test]
    fn test_hazardous_containers_rank_highest() {
        let max = litter_taxonomy().iter().max_by_key(|c| c.severity).unwrap();
        assert_eq!(max.name, "chemical_containers");
        assert_eq!(max.severity, 10);
    }
}
