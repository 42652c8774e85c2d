// src/extract/maps.rs
//
// Named parse maps for the equipment commands this crate polls. The patterns
// are transcriptions of the console output formats and are opaque firmware
// contracts; keep them byte-for-byte when the firmware does not change.

use crate::error::Result;

use super::ParseMap;

/// Owner symbol ids appearing in `buf vsat_owners` dumps. Their meaning is
/// firmware-internal and undocumented; treat as opaque tokens.
pub const OWNER_SYM_1352: &str = "1352";
pub const OWNER_SYM_1652: &str = "1652";
pub const OWNER_SYM_1462: &str = "1462";

/// `tele cac global` on the HSP console.
pub fn hsp_tele_cac_global() -> Result<ParseMap> {
    ParseMap::compile(&[
        ("Current SDR", r"\W*Current SDR capacity usage:\W*(\d*)%"),
        ("Max SDR", r".*Max SDR Capacity Limit:\W*(\d*)%"),
    ])
}

/// `stat cac link` rejection counters: four request types crossed with nine
/// rejection causes, expanded from one pattern template per type.
pub fn hsp_stat_cac_link() -> Result<ParseMap> {
    const TYPES: &[(&str, &str)] = &[
        ("new", r"\W*Number.*new.*-\W\b@\b\W*(\d*)"),
        ("modify", r"\W*Number.*modify.*-\W\b@\b\W*(\d*)"),
        ("change_to_rob", r"\W*Number.*change.*robust.*-\W\b@\b\W*(\d*)"),
        (
            "change_to_eff",
            r"\W*Number.*change.*efficient.*-\W\b@\b\W*(\d*)",
        ),
    ];
    const CAUSES: &[&str] = &[
        "NO_CAUSE",
        "BACKHAULING_LIMIT",
        "CBR_LIMIT",
        "NO_FREE_BW",
        "NO_VOIP_ALLOC_OPTION",
        "GLOBAL_BW_LIMIT",
        "MPN_MIR",
        "OUT_OF_VSAT_CAPACITY",
        "NO_FREE_BW_FOR_VOIP",
    ];

    let mut pairs: Vec<(String, String)> = Vec::with_capacity(TYPES.len() * CAUSES.len());
    for (kind, template) in TYPES {
        for cause in CAUSES {
            pairs.push((format!("{}_{}", kind, cause), template.replace('@', cause)));
        }
    }
    let borrowed: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(n, p)| (n.as_str(), p.as_str()))
        .collect();
    ParseMap::compile(&borrowed)
}

/// Summary counters for the well-known owner symbols in a `buf vsat_owners`
/// dump. The outbound counter is read from the 1652 row and the inbound
/// counter from the 1462 row; the 1352 row carries both but is shadowed by
/// the other two in the deployed tooling, which this map reproduces.
pub fn buf_vsat_owners() -> Result<ParseMap> {
    let outbound = format!(r"\W{}\W*(\d*)\W*\d*", OWNER_SYM_1652);
    let inbound = format!(r"\W{}\W*\d*\W*(\d*)", OWNER_SYM_1462);
    ParseMap::compile(&[
        ("Outbound_buffers", &outbound),
        ("Inbound_buffers", &inbound),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract, MatchStrategy};

    #[test]
    fn cac_link_map_expands_every_type_cause_combination() {
        let map = hsp_stat_cac_link().unwrap();
        assert_eq!(map.fields().len(), 36);
        assert!(map.fields().iter().any(|f| f.name == "new_NO_CAUSE"));
        assert!(map
            .fields()
            .iter()
            .any(|f| f.name == "change_to_eff_NO_FREE_BW_FOR_VOIP"));
    }

    #[test]
    fn cac_link_patterns_scrape_rejection_counter_lines() {
        let raw = " Number of rejected new requests - NO_FREE_BW  17\n\r\
                    Number of rejected modify requests - CBR_LIMIT  3";
        let map = hsp_stat_cac_link().unwrap();
        let record = extract(raw, &map, "HSP_67", MatchStrategy::FirstMatch);
        assert_eq!(record.get("new_NO_FREE_BW"), Some("17"));
        assert_eq!(record.get("modify_CBR_LIMIT"), Some("3"));
    }

    #[test]
    fn owner_symbol_map_reads_outbound_and_inbound_rows() {
        // the 1352 row carries both counters but is shadowed by the other two
        let raw = format!(
            " {}   5   6\n\r {}   40   41\n\r {}   50   51",
            OWNER_SYM_1352, OWNER_SYM_1652, OWNER_SYM_1462
        );
        let map = buf_vsat_owners().unwrap();
        let record = extract(&raw, &map, "owners", MatchStrategy::FirstMatch);
        assert_eq!(record.get("Outbound_buffers"), Some("40"));
        assert_eq!(record.get("Inbound_buffers"), Some("51"));
    }
}
