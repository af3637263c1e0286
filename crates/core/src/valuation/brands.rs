use crate::domain::asset::{AssetDescriptor, Category};
use crate::errors::ValuationError;

const WATCH_BRANDS: &[&str] = &[
    "Rolex",
    "Omega",
    "Patek Philippe",
    "Audemars Piguet",
    "Cartier",
    "TAG Heuer",
    "Breitling",
    "IWC",
    "Jaeger-LeCoultre",
    "Panerai",
    "Tudor",
    "Grand Seiko",
    "Longines",
    "Zenith",
    "Hublot",
];

const JEWELRY_BRANDS: &[&str] = &[
    "Tiffany",
    "Cartier",
    "Van Cleef & Arpels",
    "Harry Winston",
    "Bulgari",
    "Chopard",
    "Graff",
    "Mikimoto",
    "David Yurman",
    "Pandora",
    "Swarovski",
];

const HANDBAG_BRANDS: &[&str] = &[
    "Hermes",
    "Hermès",
    "Chanel",
    "Louis Vuitton",
    "Gucci",
    "Prada",
    "Saint Laurent",
    "Celine",
    "Bottega Veneta",
    "Fendi",
    "Balenciaga",
    "Dior",
];

const ELECTRONICS_BRANDS: &[&str] = &[
    "Apple",
    "Samsung",
    "Sony",
    "Bose",
    "Canon",
    "Nikon",
    "Dell",
    "HP",
    "Lenovo",
    "Microsoft",
    "Google",
    "LG",
    "Asus",
];

const INSTRUMENT_BRANDS: &[&str] = &[
    "Gibson",
    "Fender",
    "Steinway",
    "Martin",
    "Taylor",
    "Yamaha",
    "Roland",
    "Korg",
    "Selmer",
    "Stradivarius",
    "Ibanez",
];

const CAMERA_BRANDS: &[&str] = &[
    "Canon",
    "Nikon",
    "Leica",
    "Sony",
    "Fujifilm",
    "Hasselblad",
    "Pentax",
    "Sigma",
    "Tamron",
    "Mamiya",
    "Rollei",
    "Phase One",
];

/// Checks the submitted brand against the catalog for its category. Unknown
/// categories and the generic `Other` bucket carry no catalog and pass
/// through untouched.
pub fn verify(asset: &AssetDescriptor) -> Result<(), ValuationError> {
    let catalog = match asset.category_kind() {
        Some(Category::Watches) => WATCH_BRANDS,
        Some(Category::Jewelry) => JEWELRY_BRANDS,
        Some(Category::Handbags) => HANDBAG_BRANDS,
        Some(Category::Electronics) => ELECTRONICS_BRANDS,
        Some(Category::Instruments) => INSTRUMENT_BRANDS,
        Some(Category::Cameras) => CAMERA_BRANDS,
        Some(Category::Other) | None => return Ok(()),
    };

    let submitted = asset.brand.trim().to_lowercase();
    let recognized = catalog.iter().any(|entry| {
        let entry = entry.to_lowercase();
        entry.contains(&submitted) || submitted.contains(&entry)
    });

    if recognized {
        Ok(())
    } else {
        Err(ValuationError::Validation(format!(
            "Brand \"{}\" not recognized in {} category",
            asset.brand.trim(),
            asset.category.trim()
        )))
    }
}
