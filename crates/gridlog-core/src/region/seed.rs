//! Built-in region catalog derived from the NERC Q2 2025 report.
//!
//! Eleven distribution company profiles with their service states, address
//! keywords and quarterly offtake figures. The schedule template for each
//! region is banded from its estimated full-load hours.

use super::{RegionProfile, ScheduleBlock};
use crate::error::ScheduleError;

const SOURCE_TAG: &str = "NERC Q2 2025";

struct SeedRow {
    id: &'static str,
    name: &'static str,
    states: &'static [&'static str],
    keywords: &'static [&'static str],
    avg_offtake: f64,
    avg_pcc: f64,
    pct: f64,
}

const SEED_ROWS: &[SeedRow] = &[
    SeedRow {
        id: "abuja",
        name: "Abuja Electricity Distribution Plc (AEDC)",
        states: &["fct", "abuja", "niger", "kogi", "nasarawa"],
        keywords: &["abuja", "fct", "gwarinpa", "lokoja", "mina", "lafia"],
        avg_offtake: 547.84,
        avg_pcc: 611.00,
        pct: 89.66,
    },
    SeedRow {
        id: "benin",
        name: "Benin Electricity Distribution Plc (BEDC)",
        states: &["edo", "delta", "ondo", "ekiti"],
        keywords: &["benin", "asaba", "warri", "akure", "ado ekiti", "sapele"],
        avg_offtake: 338.35,
        avg_pcc: 338.35,
        pct: 100.0,
    },
    SeedRow {
        id: "eko",
        name: "Eko Electricity Distribution Plc (EKEDC)",
        states: &["lagos island", "eti osa", "apapa", "lagos south"],
        keywords: &["victoria island", "lekki", "ajah", "apapa", "surulere", "ikoyi"],
        avg_offtake: 481.59,
        avg_pcc: 508.87,
        pct: 94.64,
    },
    SeedRow {
        id: "enugu",
        name: "Enugu Electricity Distribution Plc (EEDC)",
        states: &["enugu", "ebonyi", "anambra", "abia", "imo"],
        keywords: &["enugu", "awka", "aba", "owerri", "umahia", "onitsha"],
        avg_offtake: 307.03,
        avg_pcc: 313.81,
        pct: 97.84,
    },
    SeedRow {
        id: "ibadan",
        name: "Ibadan Electricity Distribution Plc (IBEDC)",
        states: &["oyo", "ogun", "osun", "kwara", "ekiti north"],
        keywords: &["ibadan", "ilorin", "abeokuta", "osogbo", "shaki"],
        avg_offtake: 418.76,
        avg_pcc: 461.37,
        pct: 90.76,
    },
    SeedRow {
        id: "ikeja",
        name: "Ikeja Electric Plc (IE)",
        states: &["lagos mainland"],
        keywords: &["ikeja", "agege", "ikorodu", "ikotun", "oshodi", "alimosho"],
        avg_offtake: 567.76,
        avg_pcc: 591.29,
        pct: 96.02,
    },
    SeedRow {
        id: "jos",
        name: "Jos Electricity Distribution Plc (JED)",
        states: &["plateau", "gombe", "bauchi", "benue"],
        keywords: &["jos", "gombe", "bauchi", "makurdi", "otukpo"],
        avg_offtake: 168.07,
        avg_pcc: 208.69,
        pct: 80.54,
    },
    SeedRow {
        id: "kaduna",
        name: "Kaduna Electricity Distribution Plc (KAEDC)",
        states: &["kaduna", "zamfara", "sokoto", "kebbi"],
        keywords: &["kaduna", "zaria", "sokoto", "gusau", "birnin kebbi"],
        avg_offtake: 176.81,
        avg_pcc: 234.58,
        pct: 75.37,
    },
    SeedRow {
        id: "kano",
        name: "Kano Electricity Distribution Plc (KEDCO)",
        states: &["kano", "jigawa", "katsina"],
        keywords: &["kano", "dutse", "katsina", "kazaure"],
        avg_offtake: 204.11,
        avg_pcc: 246.34,
        pct: 82.86,
    },
    SeedRow {
        id: "port_harcourt",
        name: "Port Harcourt Electricity Distribution Plc (PHED)",
        states: &["rivers", "akwa ibom", "bayelsa", "cross river"],
        keywords: &["port harcourt", "uyo", "calabar", "yenagoa"],
        avg_offtake: 266.78,
        avg_pcc: 278.32,
        pct: 95.85,
    },
    SeedRow {
        id: "yola",
        name: "Yola Electricity Distribution Plc (YEDC)",
        states: &["adamawa", "taraba", "borno", "yobe"],
        keywords: &["yola", "maiduguri", "jalingo", "damaturu", "mubi"],
        avg_offtake: 105.51,
        avg_pcc: 110.82,
        pct: 95.2,
    },
];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Construct an ON-block schedule banded from the estimated full-load hours.
pub fn build_schedule_template(full_load_hours: f64) -> Result<Vec<ScheduleBlock>, ScheduleError> {
    let blocks: &[(&str, &str)] = if full_load_hours >= 23.0 {
        &[("00:00", "23:59")]
    } else if full_load_hours >= 21.5 {
        &[("00:00", "11:00"), ("14:00", "23:59")]
    } else if full_load_hours >= 19.5 {
        &[("05:00", "11:00"), ("16:00", "23:30")]
    } else if full_load_hours >= 17.5 {
        &[("05:30", "10:30"), ("13:30", "17:30"), ("19:30", "23:30")]
    } else {
        &[("05:00", "09:00"), ("12:00", "16:00"), ("19:00", "22:00")]
    };
    blocks
        .iter()
        .map(|&(start, end)| ScheduleBlock::parse(start, end))
        .collect()
}

/// The full built-in catalog, with derived figures computed from the raw
/// quarterly numbers.
pub fn builtin_regions() -> Result<Vec<RegionProfile>, ScheduleError> {
    SEED_ROWS
        .iter()
        .map(|row| {
            let estimated_full_load_hours = round2(row.pct / 100.0 * 24.0);
            Ok(RegionProfile {
                id: row.id.to_string(),
                name: row.name.to_string(),
                states: row.states.iter().map(|s| s.to_string()).collect(),
                keywords: row.keywords.iter().map(|k| k.to_string()).collect(),
                avg_offtake_mwh_per_hour: row.avg_offtake,
                avg_available_pcc_mwh_per_hour: row.avg_pcc,
                utilisation_percent: row.pct,
                estimated_daily_mwh: round2(row.avg_offtake * 24.0),
                estimated_full_load_hours,
                schedule_template: build_schedule_template(estimated_full_load_hours)?,
                source: SOURCE_TAG.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn all_seed_rows_parse() {
        let regions = builtin_regions().unwrap();
        assert_eq!(regions.len(), 11);
        for region in &regions {
            assert!(!region.schedule_template.is_empty());
            assert!(!region.keywords.is_empty());
            assert_eq!(region.source, "NERC Q2 2025");
        }
    }

    #[test]
    fn derived_figures_match_raw_data() {
        let regions = builtin_regions().unwrap();
        let abuja = regions.iter().find(|r| r.id == "abuja").unwrap();
        assert_eq!(abuja.estimated_daily_mwh, 13148.16);
        assert_eq!(abuja.estimated_full_load_hours, 21.52);
    }

    #[test]
    fn template_bands() {
        // >= 23h: single all-day block
        let full = build_schedule_template(23.5).unwrap();
        assert_eq!(full.len(), 1);
        // >= 21.5h: two blocks
        assert_eq!(build_schedule_template(21.52).unwrap().len(), 2);
        // >= 19.5h: two daytime/evening blocks
        let band = build_schedule_template(19.89).unwrap();
        assert_eq!(band.len(), 2);
        assert!(band[0].contains(t(5, 30)));
        // >= 17.5h: three blocks
        assert_eq!(build_schedule_template(18.09).unwrap().len(), 3);
        // lowest band: three shorter blocks
        let low = build_schedule_template(12.0).unwrap();
        assert_eq!(low.len(), 3);
        assert!(low[2].contains(t(20, 0)));
        assert!(!low[2].contains(t(22, 0)));
    }

    #[test]
    fn benin_is_always_on_kaduna_is_off_at_noon() {
        let regions = builtin_regions().unwrap();
        let benin = regions.iter().find(|r| r.id == "benin").unwrap();
        assert!(benin.should_be_on(t(3, 0)));
        assert!(benin.should_be_on(t(12, 0)));
        let kaduna = regions.iter().find(|r| r.id == "kaduna").unwrap();
        assert!(!kaduna.should_be_on(t(12, 0)));
        assert!(kaduna.should_be_on(t(14, 0)));
    }
}
