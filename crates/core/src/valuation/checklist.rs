use std::sync::OnceLock;

use regex::Regex;

use crate::domain::asset::{AssetDescriptor, Category};
use crate::errors::ValuationError;

/// Verifies that the listing text carries the details an appraiser needs for
/// this kind of item. The rules key off brand and model because the details
/// that move price differ wildly between, say, a Submariner and a MacBook.
pub fn verify(asset: &AssetDescriptor) -> Result<(), ValuationError> {
    let missing = missing_details(asset);
    if missing.is_empty() {
        return Ok(());
    }

    Err(ValuationError::InsufficientInformation(format!(
        "For an accurate {} {} quote, please add: {}",
        asset.brand.trim(),
        asset.model.trim(),
        missing.join(", ")
    )))
}

fn missing_details(asset: &AssetDescriptor) -> Vec<&'static str> {
    let category = match asset.category_kind() {
        Some(category) => category,
        None => return Vec::new(),
    };

    let brand = asset.brand.trim().to_lowercase();
    let model = asset.model.trim().to_lowercase();
    // Details supplied in the model field count the same as ones in the
    // description, so both are searched together.
    let text = format!("{} {}", model, asset.description.as_deref().unwrap_or_default())
        .to_lowercase();

    match category {
        Category::Watches => watch_details(&brand, &model, &text),
        Category::Jewelry => jewelry_details(&text),
        Category::Handbags => handbag_details(&brand, &model, &text),
        Category::Electronics => electronics_details(&brand, &model, &text),
        Category::Instruments => instrument_details(&brand, &text),
        Category::Cameras => camera_details(&text),
        Category::Other => Vec::new(),
    }
}

fn watch_details(brand: &str, model: &str, text: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if brand.contains("rolex") {
        if !mentions_year(text) {
            missing.push("Year of manufacture");
        }
        if model.contains("submariner") && !mentions_reference(text) {
            missing.push("Reference number");
        }
        if !mentions_box_papers(text) {
            missing.push("Box and papers status");
        }
    } else if brand.contains("patek") {
        if !mentions_year(text) {
            missing.push("Year of manufacture");
        }
        if !mentions_reference(text) {
            missing.push("Reference number");
        }
        if !mentions_box_papers(text) {
            missing.push("Box and papers status");
        }
    } else if brand.contains("omega") {
        if model.contains("speedmaster") && !mentions_movement(text) {
            missing.push("Movement type");
        }
        if !mentions_year_or_generation(text) {
            missing.push("Year or generation");
        }
    } else {
        let has_identifying_detail =
            mentions_year(text) || mentions_case_size(text) || mentions_material(text);
        if !has_identifying_detail {
            missing.push("Year, case size, or material details");
        }
    }

    missing
}

fn jewelry_details(text: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if !mentions_metal(text) {
        missing.push("Metal type");
    }
    if mentions_diamond(text) && !mentions_diamond_specs(text) {
        missing.push("Diamond specifications (carat, clarity)");
    }
    if !mentions_jewelry_size(text) {
        missing.push("Size information");
    }

    missing
}

fn handbag_details(brand: &str, model: &str, text: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if brand.contains("herm") {
        if !mentions_bag_size(text) {
            missing.push("Size information");
        }
        if !mentions_color(text) {
            missing.push("Color");
        }
        if !mentions_leather(text) {
            missing.push("Leather type");
        }
        if !mentions_hardware(text) {
            missing.push("Hardware details");
        }
    } else if brand.contains("chanel") {
        if !mentions_bag_size(text) {
            missing.push("Size information");
        }
        if !mentions_color(text) {
            missing.push("Color");
        }
        if model.contains("classic") && !mentions_flap_or_quilting(text) {
            missing.push("Flap style or quilting details");
        }
    } else {
        if !mentions_color(text) {
            missing.push("Color");
        }
        if !mentions_condition_detail(text) {
            missing.push("Condition details");
        }
    }

    missing
}

fn electronics_details(brand: &str, model: &str, text: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if brand.contains("apple") {
        if model.contains("iphone") {
            if !mentions_storage(text) {
                missing.push("Storage capacity");
            }
            if !mentions_carrier(text) {
                missing.push("Carrier status");
            }
        }
        if model.contains("macbook") {
            if !mentions_specs(text) {
                missing.push("Technical specifications");
            }
            if !mentions_screen_size(text) {
                missing.push("Screen size");
            }
        }
        if !mentions_year_or_generation(text) {
            missing.push("Year or generation");
        }
    } else if brand.contains("canon") || brand.contains("nikon") {
        if !mentions_lens(text) {
            missing.push("Lens information");
        }
        if !mentions_shutter_count(text) {
            missing.push("Shutter count");
        }
    }

    missing
}

fn instrument_details(brand: &str, text: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if brand.contains("gibson") || brand.contains("fender") {
        if !mentions_year(text) {
            missing.push("Year of manufacture");
        }
        if !mentions_serial(text) {
            missing.push("Serial number");
        }
        if !mentions_condition_detail(text) {
            missing.push("Condition details");
        }
    } else if brand.contains("steinway") && !mentions_piano_details(text) {
        missing.push("Piano details (model, size, serial)");
    }

    missing
}

fn camera_details(text: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if !mentions_shutter_count(text) {
        missing.push("Shutter count");
    }
    if !mentions_lens(text) {
        missing.push("Lens information");
    }
    if !mentions_accessories(text) {
        missing.push("Included accessories");
    }

    missing
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

fn mentions_year(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid regex"));
    pattern.is_match(text) || text.contains("year")
}

fn mentions_year_or_generation(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\bgen\b").expect("valid regex"));
    mentions_year(text) || pattern.is_match(text) || text.contains("generation")
}

fn mentions_reference(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"\bref\b|reference|\d{5}").expect("valid regex"));
    pattern.is_match(text)
}

fn mentions_box_papers(text: &str) -> bool {
    contains_any(text, &["box", "papers", "card", "warranty", "documentation"])
}

fn mentions_movement(text: &str) -> bool {
    contains_any(
        text,
        &["automatic", "manual", "quartz", "caliber", "calibre", "movement", "hand-wound"],
    )
}

fn mentions_case_size(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\b\d{2}\s*mm\b").expect("valid regex"));
    pattern.is_match(text) || text.contains("size")
}

fn mentions_material(text: &str) -> bool {
    contains_any(text, &["steel", "gold", "platinum", "titanium", "ceramic", "bronze"])
}

fn mentions_metal(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\b\d{1,2}k\b").expect("valid regex"));
    contains_any(text, &["gold", "silver", "platinum", "sterling"]) || pattern.is_match(text)
}

fn mentions_diamond(text: &str) -> bool {
    contains_any(text, &["diamond", "carat"])
}

fn mentions_diamond_specs(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\bct\b|\bcut\b").expect("valid regex"));
    contains_any(text, &["carat", "clarity", "color grade"]) || pattern.is_match(text)
}

fn mentions_jewelry_size(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"\b\d+(\.\d+)?\s*(mm|cm|inch|inches)\b").expect("valid regex")
    });
    contains_any(text, &["size", "length"]) || pattern.is_match(text)
}

fn mentions_bag_size(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\b\d{2}\s*cm\b").expect("valid regex"));
    contains_any(text, &["size", "mini", "small", "medium", "large", "jumbo", "maxi"])
        || pattern.is_match(text)
}

fn mentions_color(text: &str) -> bool {
    contains_any(
        text,
        &[
            "black", "white", "brown", "tan", "beige", "red", "blue", "green", "navy", "pink",
            "purple", "orange", "yellow", "grey", "gray", "gold", "silver", "burgundy", "cream",
            "noir",
        ],
    )
}

fn mentions_leather(text: &str) -> bool {
    contains_any(
        text,
        &[
            "leather", "togo", "epsom", "clemence", "swift", "ostrich", "crocodile", "caviar",
            "lambskin", "suede", "canvas",
        ],
    )
}

fn mentions_hardware(text: &str) -> bool {
    contains_any(text, &["hardware", "ghw", "phw", "palladium", "gold-tone", "silver-tone"])
}

fn mentions_flap_or_quilting(text: &str) -> bool {
    contains_any(text, &["flap", "quilt", "caviar", "lambskin"])
}

fn mentions_condition_detail(text: &str) -> bool {
    contains_any(
        text,
        &[
            "corner", "handle", "scratch", "scuff", "wear", "stain", "crack", "dent", "finish",
            "fading", "patina",
        ],
    )
}

fn mentions_storage(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"\b\d+\s*(gb|tb)\b").expect("valid regex"));
    pattern.is_match(text)
}

fn mentions_carrier(text: &str) -> bool {
    contains_any(text, &["unlocked", "locked", "verizon", "at&t", "t-mobile", "sprint", "carrier"])
}

fn mentions_specs(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"\b(i[3579]|m[1-4])\b").expect("valid regex"));
    contains_any(text, &["ram", "ssd", "processor", "chip", "core"]) || pattern.is_match(text)
}

fn mentions_screen_size(text: &str) -> bool {
    contains_any(text, &["inch", "screen", "display"])
}

fn mentions_lens(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"\b\d{2,3}\s*mm\b|f/\d").expect("valid regex"));
    text.contains("lens") || pattern.is_match(text)
}

fn mentions_shutter_count(text: &str) -> bool {
    contains_any(text, &["shutter", "actuation", "click"])
}

fn mentions_serial(text: &str) -> bool {
    text.contains("serial") || text.contains("s/n")
}

fn mentions_piano_details(text: &str) -> bool {
    contains_any(text, &["grand", "upright", "serial", "size"])
}

fn mentions_accessories(text: &str) -> bool {
    contains_any(
        text,
        &["box", "charger", "battery", "strap", "case", "bag", "manual", "accessor", "card"],
    )
}

#[cfg(test)]
mod tests {
    use crate::domain::asset::AssetDescriptor;
    use crate::errors::ValuationError;

    use super::verify;

    fn asset(category: &str, brand: &str, model: &str, description: Option<&str>) -> AssetDescriptor {
        AssetDescriptor {
            category: category.to_string(),
            brand: brand.to_string(),
            model: model.to_string(),
            condition: "good".to_string(),
            description: description.map(str::to_string),
            user_estimated_value: None,
        }
    }

    fn asset_with_description(
        category: &str,
        brand: &str,
        model: &str,
        description: &str,
    ) -> AssetDescriptor {
        asset(category, brand, model, Some(description))
    }

    fn missing_message(asset: &AssetDescriptor) -> String {
        match verify(asset) {
            Err(ValuationError::InsufficientInformation(message)) => message,
            other => panic!("expected insufficient information, got {other:?}"),
        }
    }

    #[test]
    fn submariner_without_reference_number_is_incomplete() {
        let asset = asset(
            "Luxury Watches",
            "Rolex",
            "Submariner",
            Some("Comes with box and papers"),
        );
        let message = missing_message(&asset);
        assert!(message.contains("Reference number"));
        assert!(message.contains("Year of manufacture"));
        assert!(message.starts_with("For an accurate Rolex Submariner quote, please add:"));
    }

    #[test]
    fn fully_described_submariner_passes() {
        let asset = asset(
            "Luxury Watches",
            "Rolex",
            "Submariner",
            Some("2019, ref 116610, full box and papers"),
        );
        assert!(verify(&asset).is_ok());
    }

    #[test]
    fn patek_needs_year_reference_and_documentation() {
        let asset = asset("Luxury Watches", "Patek Philippe", "Nautilus", Some("blue dial"));
        let message = missing_message(&asset);
        assert!(message.contains("Year of manufacture"));
        assert!(message.contains("Reference number"));
        assert!(message.contains("Box and papers status"));
    }

    #[test]
    fn speedmaster_needs_movement_type() {
        let asset = asset("Luxury Watches", "Omega", "Speedmaster", Some("1998"));
        let message = missing_message(&asset);
        assert!(message.contains("Movement type"));

        let described =
            asset_with_description("Luxury Watches", "Omega", "Speedmaster", "1998, manual wind");
        assert!(verify(&described).is_ok());
    }

    #[test]
    fn other_watch_brands_need_one_identifying_detail() {
        let bare = asset("Luxury Watches", "Cartier", "Tank", Some("lovely piece"));
        assert!(missing_message(&bare).contains("Year, case size, or material details"));

        let sized = asset("Luxury Watches", "Cartier", "Tank", Some("31mm steel"));
        assert!(verify(&sized).is_ok());
    }

    #[test]
    fn diamond_jewelry_needs_specs_and_size() {
        let asset = asset("Fine Jewelry", "Tiffany", "Diamond Ring", Some("18k gold"));
        let message = missing_message(&asset);
        assert!(message.contains("Diamond specifications (carat, clarity)"));
        assert!(message.contains("Size information"));
        assert!(!message.contains("Metal type"));
    }

    #[test]
    fn complete_jewelry_listing_passes() {
        let asset = asset(
            "Fine Jewelry",
            "Tiffany",
            "Diamond Ring",
            Some("platinum, 1.2 carat, VS1 clarity, size 6"),
        );
        assert!(verify(&asset).is_ok());
    }

    #[test]
    fn hermes_bags_need_the_full_quartet() {
        let bare = asset("Designer Handbags", "Hermes", "Birkin", None);
        let message = missing_message(&bare);
        for item in ["Size information", "Color", "Leather type", "Hardware details"] {
            assert!(message.contains(item), "message should list {item}: {message}");
        }

        let described = asset_with_description(
            "Designer Handbags",
            "Hermes",
            "Birkin",
            "30cm, black togo leather, gold hardware",
        );
        assert!(verify(&described).is_ok());
    }

    #[test]
    fn chanel_classic_needs_flap_or_quilting_details() {
        let asset = asset(
            "Designer Handbags",
            "Chanel",
            "Classic Medium",
            Some("black, medium size"),
        );
        assert!(missing_message(&asset).contains("Flap style or quilting details"));
    }

    #[test]
    fn generic_handbags_need_color_and_condition_notes() {
        let asset = asset("Designer Handbags", "Prada", "Galleria", None);
        let message = missing_message(&asset);
        assert!(message.contains("Color"));
        assert!(message.contains("Condition details"));
    }

    #[test]
    fn iphone_needs_storage_carrier_and_generation() {
        let bare = asset("Premium Electronics", "Apple", "iPhone 15", None);
        let message = missing_message(&bare);
        assert!(message.contains("Storage capacity"));
        assert!(message.contains("Carrier status"));
        assert!(message.contains("Year or generation"));

        let described = asset_with_description(
            "Premium Electronics",
            "Apple",
            "iPhone 15",
            "128GB, unlocked, 2024",
        );
        assert!(verify(&described).is_ok());
    }

    #[test]
    fn macbook_needs_specs_and_screen_size() {
        let bare = asset("Premium Electronics", "Apple", "MacBook Pro", Some("2023"));
        let message = missing_message(&bare);
        assert!(message.contains("Technical specifications"));
        assert!(message.contains("Screen size"));

        let described = asset_with_description(
            "Premium Electronics",
            "Apple",
            "MacBook Pro",
            "M2 chip, 13-inch, 2023",
        );
        assert!(verify(&described).is_ok());
    }

    #[test]
    fn camera_brands_under_electronics_need_lens_and_shutter() {
        let asset = asset("Premium Electronics", "Canon", "EOS R5", Some("body only"));
        let message = missing_message(&asset);
        assert!(message.contains("Lens information"));
        assert!(message.contains("Shutter count"));
    }

    #[test]
    fn gibson_and_fender_need_provenance() {
        let bare = asset("Musical Instruments", "Gibson", "Les Paul", None);
        let message = missing_message(&bare);
        assert!(message.contains("Year of manufacture"));
        assert!(message.contains("Serial number"));
        assert!(message.contains("Condition details"));

        let described = asset_with_description(
            "Musical Instruments",
            "Gibson",
            "Les Paul",
            "1959 reissue, serial 9-0824, light finish wear",
        );
        assert!(verify(&described).is_ok());
    }

    #[test]
    fn steinway_needs_piano_details() {
        let bare = asset("Musical Instruments", "Steinway", "Piano", None);
        assert!(missing_message(&bare).contains("Piano details"));

        let described = asset_with_description(
            "Musical Instruments",
            "Steinway",
            "Model B",
            "grand piano, serial 123456",
        );
        assert!(verify(&described).is_ok());
    }

    #[test]
    fn other_instrument_brands_have_no_checklist() {
        let asset = asset("Musical Instruments", "Yamaha", "P-125", None);
        assert!(verify(&asset).is_ok());
    }

    #[test]
    fn photography_equipment_always_needs_three_details() {
        let bare = asset("Photography Equipment", "Leica", "M6", None);
        let message = missing_message(&bare);
        assert!(message.contains("Shutter count"));
        assert!(message.contains("Lens information"));
        assert!(message.contains("Included accessories"));

        let described = asset_with_description(
            "Photography Equipment",
            "Leica",
            "M6",
            "50mm lens, roughly 5000 actuations, original box",
        );
        assert!(verify(&described).is_ok());
    }

    #[test]
    fn unknown_and_other_categories_skip_the_checklist() {
        assert!(verify(&asset("Other", "Anybrand", "Anything", None)).is_ok());
        assert!(verify(&asset("Vintage Typewriters", "Olivetti", "Lettera 32", None)).is_ok());
    }
}
