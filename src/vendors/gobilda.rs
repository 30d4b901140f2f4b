//! goBILDA storefront

use super::servocity::{BREADCRUMB, DOWNLOADS, DOWNLOAD_RENAMES, STRATEGIES};
use super::{VendorKey, VendorProfile};

const SECTION_DELETES: &[&str] = &[
    "Shop by Electrical Connector Style > ",
    "Shop by Hub Style > ",
    " Aluminum REX Shafting >",
    " Stainless Steel D-Shafting >",
    " > Motor Mounts for AndyMark NeveRest Motors > Motor Mounts for NeveRest Orbital Gear Motors",
    " > Motor Mounts for REV Robotics Motors > Motor Mounts for REV Core Hex Motor",
    " > Motor Mounts for REV Robotics Motors > Motor Mounts for REV UltraPlanetary Gearbox",
];

/// Hubs and plates the reference files under a more specific section
const SECTION_ALLOWED: &[(&str, &str)] = &[
    ("1310-0016-4012", "MOTION > Hubs > Hyper Hubs (16mm Pattern)"),
    (
        "1311-0016-1006",
        "MOTION > Hubs > Sonic Hubs > Thru-Hole Sonic Hubs (16mm Pattern)",
    ),
    (
        "1309-0016-1006",
        "MOTION > Hubs > Sonic Hubs > Sonic Hubs (16mm Pattern)",
    ),
    ("1310-0016-1006", "MOTION > Hubs > Hyper Hubs (16mm Pattern)"),
    (
        "1312-0016-1006",
        "MOTION > Hubs > Sonic Hubs > Double Sonic Hubs (16mm Pattern)",
    ),
    (
        "1309-0016-0006",
        "MOTION > Hubs > Sonic Hubs > Sonic Hubs (16mm Pattern)",
    ),
    ("1310-0016-0008", "MOTION > Hubs > Hyper Hubs (16mm Pattern)"),
    ("1310-0016-5008", "MOTION > Hubs > Hyper Hubs (16mm Pattern)"),
    ("1123-0048-0048", "STRUCTURE > Pattern Plates"),
];

pub(super) static PROFILE: VendorProfile = VendorProfile {
    key: VendorKey::Gobilda,
    seed: "https://www.gobilda.com/structure/",
    presets: &[
        "https://www.gobilda.com/structure/",
        "https://www.gobilda.com/motion/",
        "https://www.gobilda.com/electronics/",
        "https://www.gobilda.com/hardware/",
        "https://www.gobilda.com/kits/",
    ],
    outfile: "gobilda.txt",
    catalog: "gobilda_catalog.csv",
    strip_query: true,
    skip_prefixes: &[],
    section_deletes: SECTION_DELETES,
    section_allowed: SECTION_ALLOWED,
    section_equivalents: &[],
    download_renames: DOWNLOAD_RENAMES,
    breadcrumb: BREADCRUMB,
    downloads: DOWNLOADS,
    discontinued_marker: Some("p.discontinued"),
    strategies: STRATEGIES,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PartData, ReferenceIndex};
    use crate::crawler::testing::Harness;

    #[test]
    fn test_section_rules() {
        let rules = PROFILE.match_rules();
        assert_eq!(
            rules.allowed_section("1123-0048-0048"),
            Some("STRUCTURE > Pattern Plates")
        );
        assert_eq!(rules.allowed_section("ASCC8074"), None);
        assert_eq!(
            rules.strip_section("MOTION > Hubs > Shop by Hub Style > Hyper Hubs"),
            "MOTION > Hubs > Hyper Hubs"
        );
        assert_eq!(
            rules.strip_section("STRUCTURE > Belts > XL Series, 3/8\" Width Timing Belts"),
            "STRUCTURE > Belts > XL Series, 3/8\" Width Timing Belts"
        );
    }

    #[test]
    fn test_lazy_load_and_grid_together() {
        let page = r#"<html><head><script>
              window.stencilBootstrap("category", "{\"subcategories\":[{\"url\":\"https://www.gobilda.com/chain/\"}],\"x\":1}").load();
            </script></head><body>
            <ul class="breadcrumbs"><li class="breadcrumb s"><a class="breadcrumb-label" href="/motion/">MOTION</a></li></ul>
            <ul class="threeColumnProductGrid">
              <li class="product"><a data-card-type="" title="Sprocket" href="/sprocket/">s</a></li>
            </ul></body></html>"#;

        let mut harness = Harness::new(VendorKey::Gobilda, ReferenceIndex::new());
        assert!(harness.process("https://www.gobilda.com/motion/", page));

        let queued = harness.queued();
        assert_eq!(
            queued,
            vec![
                ("https://www.gobilda.com/sprocket/".to_string(), "MOTION > Sprocket".to_string()),
                ("https://www.gobilda.com/chain/".to_string(), "MOTION".to_string()),
            ]
        );
    }

    #[test]
    fn test_allowed_section_keeps_reference() {
        let mut reference = ReferenceIndex::new();
        reference.add_part(PartData {
            order: 9,
            section: "MOTION > Hubs > Hyper Hubs (16mm Pattern)".to_string(),
            name: "Hyper Hub".to_string(),
            sku: "1310-0016-4012".to_string(),
            url: "https://www.gobilda.com/hyper-hub/".to_string(),
            ..Default::default()
        });

        let page = r#"<ul class="breadcrumbs">
              <li class="breadcrumb a"><a class="breadcrumb-label" href="/kits/">KITS</a></li></ul>
            <div><div itemtype="http://schema.org/Product">
              <meta itemprop="name" content="Hyper Hub"><meta itemprop="sku" content="1310-0016-4012">
            </div></div>"#;
        let mut harness = Harness::new(VendorKey::Gobilda, reference);
        harness.process("https://www.gobilda.com/hyper-hub/", page);

        let lines = harness.lines();
        assert!(lines[0].starts_with("1`MOTION > Hubs > Hyper Hubs (16mm Pattern)`Hyper Hub`"));
        assert!(lines[0].contains("`Unchanged`"));
    }
}
