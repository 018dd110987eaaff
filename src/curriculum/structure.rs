//! Static reference tables for the French medical curriculum.
//!
//! Keyed by study year. Consulted by question validation; never stored
//! per-row and never mutated at runtime.

use crate::models::question::ExamType;

const EMD_SPLIT: &[ExamType] = &[ExamType::Emd1, ExamType::Emd2, ExamType::Rattrapage];
const EMD_SINGLE: &[ExamType] = &[ExamType::Emd, ExamType::Rattrapage];

/// First-year modules and their exam sessions. No unites in first year.
pub const FIRST_YEAR_MODULES: &[(&str, &[ExamType])] = &[
    ("Anatomie", EMD_SPLIT),
    ("Biochimie", EMD_SPLIT),
    ("Biophysique", EMD_SPLIT),
    ("Biostatistique / Informatique", EMD_SPLIT),
    ("Chimie", EMD_SPLIT),
    ("Cytologie", EMD_SPLIT),
    ("Embryologie", EMD_SINGLE),
    ("Histologie", EMD_SINGLE),
    ("Physiologie", EMD_SINGLE),
    ("S.S.H", EMD_SINGLE),
];

pub struct UniteGroup {
    pub name: &'static str,
    pub modules: &'static [&'static str],
}

pub const SECOND_YEAR_UNITES: &[UniteGroup] = &[
    UniteGroup {
        name: "Appareil Cardio-vasculaire et Respiratoire",
        modules: &["Anatomie", "Histologie", "Physiologie", "Biophysique"],
    },
    UniteGroup {
        name: "Appareil Digestif",
        modules: &["Anatomie", "Histologie", "Physiologie", "Biochimie"],
    },
    UniteGroup {
        name: "Appareil Urinaire",
        modules: &["Anatomie", "Histologie", "Physiologie", "Biochimie"],
    },
    UniteGroup {
        name: "Appareil Endocrinien et de la Reproduction",
        modules: &["Anatomie", "Histologie", "Physiologie", "Biochimie"],
    },
    UniteGroup {
        name: "Appareil Nerveux et Organes des Sens",
        modules: &["Anatomie", "Histologie", "Physiologie", "Biophysique"],
    },
];

pub const SECOND_YEAR_STANDALONE: &[&str] = &["Génétique", "Immunologie"];

pub const THIRD_YEAR_UNITES: &[UniteGroup] = &[
    UniteGroup {
        name: "Appareil Cardio-vasculaire et Appareil Respiratoire",
        modules: &["Semiologie", "physiopathologie", "radiologie", "biochimie"],
    },
    UniteGroup {
        name: "Psychologie Médicale et Semiologie Générale",
        modules: &["Semiologie", "physiopathologie", "radiologie", "biochimie"],
    },
    UniteGroup {
        name: "Appareil Neurologique",
        modules: &["Semiologie", "physiopathologie", "radiologie", "biochimie"],
    },
    UniteGroup {
        name: "Appareil Endocrinien",
        modules: &["Semiologie", "physiopathologie", "radiologie", "biochimie"],
    },
    UniteGroup {
        name: "Appareil Urinaire",
        modules: &["Semiologie", "physiopathologie", "radiologie", "biochimie"],
    },
    UniteGroup {
        name: "Appareil Digestif",
        modules: &["Semiologie", "physiopathologie", "radiologie", "biochimie"],
    },
];

pub const THIRD_YEAR_STANDALONE: &[&str] = &[
    "Anatomie pathologique",
    "Immunologie",
    "Pharmacologie",
    "Microbiologie",
    "Parasitologie",
];

fn unites_for_year(study_year: u8) -> &'static [UniteGroup] {
    match study_year {
        2 => SECOND_YEAR_UNITES,
        3 => THIRD_YEAR_UNITES,
        _ => &[],
    }
}

fn standalone_for_year(study_year: u8) -> &'static [&'static str] {
    match study_year {
        2 => SECOND_YEAR_STANDALONE,
        3 => THIRD_YEAR_STANDALONE,
        _ => &[],
    }
}

/// All selectable modules for a study year. For years 2-3 this is the
/// unite names plus the standalone modules, mirroring how the catalog
/// presents them.
pub fn modules_for_year(study_year: u8) -> Vec<&'static str> {
    match study_year {
        1 => FIRST_YEAR_MODULES.iter().map(|(name, _)| *name).collect(),
        2 | 3 => unites_for_year(study_year)
            .iter()
            .map(|group| group.name)
            .chain(standalone_for_year(study_year).iter().copied())
            .collect(),
        _ => Vec::new(),
    }
}

/// Valid exam sessions for a module in a study year. Empty for unknown
/// modules and out-of-range years.
pub fn exam_types_for_module(study_year: u8, module: &str) -> &'static [ExamType] {
    match study_year {
        1 => FIRST_YEAR_MODULES
            .iter()
            .find(|(name, _)| *name == module)
            .map(|(_, types)| *types)
            .unwrap_or(&[]),
        2 | 3 => {
            let known = modules_for_year(study_year)
                .iter()
                .any(|name| *name == module)
                || unites_for_year(study_year)
                    .iter()
                    .any(|group| group.modules.iter().any(|member| *member == module));
            if known {
                EMD_SINGLE
            } else {
                &[]
            }
        }
        _ => &[],
    }
}

/// Whether a name refers to a unite grouping rather than a plain module.
pub fn is_unite(study_year: u8, name: &str) -> bool {
    unites_for_year(study_year).iter().any(|group| group.name == name)
}

/// Member modules of a unite. Empty for unknown unites.
pub fn modules_in_unite(study_year: u8, unite: &str) -> &'static [&'static str] {
    unites_for_year(study_year)
        .iter()
        .find(|group| group.name == unite)
        .map(|group| group.modules)
        .unwrap_or(&[])
}
