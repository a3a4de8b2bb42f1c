//! Vehicle catalog lookup and rendering

use zailo_bot_core::{Price, Vehicle};
use zailo_bot_text_processing::{format_currency, normalize_text, parse_currency};

/// Inputs shorter than this (after normalization) never match
const MIN_QUERY_LEN: usize = 3;

/// Keywords shorter than this are ignored on both sides
const MIN_KEYWORD_LEN: usize = 2;

/// Static stock list, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    vehicles: Vec<Vehicle>,
}

impl Catalog {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self { vehicles }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Vehicles whose name matches the free-text query, in catalog order.
    ///
    /// A vehicle matches when every query keyword is a substring of its
    /// normalized name, or when any query keyword equals one of its name
    /// tokens.
    pub fn find_by_name(&self, query: &str) -> Vec<&Vehicle> {
        let normalized = normalize_text(query);
        if normalized.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let keywords: Vec<&str> = normalized
            .split_whitespace()
            .filter(|word| word.chars().count() >= MIN_KEYWORD_LEN)
            .collect();
        if keywords.is_empty() {
            return Vec::new();
        }

        self.vehicles
            .iter()
            .filter(|vehicle| {
                let name = normalize_text(&vehicle.name);
                if keywords.iter().all(|keyword| name.contains(keyword)) {
                    return true;
                }
                let tokens: Vec<&str> = name
                    .split_whitespace()
                    .filter(|word| word.chars().count() >= MIN_KEYWORD_LEN)
                    .collect();
                keywords.iter().any(|keyword| tokens.contains(keyword))
            })
            .collect()
    }

    /// Full stock list message
    pub fn render_list(&self) -> String {
        if self.vehicles.is_empty() {
            return "Lamentamos, mas estamos sem carros no estoque no momento. Por favor, retorne mais tarde!"
                .to_string();
        }

        let lines: Vec<String> = self
            .vehicles
            .iter()
            .map(|vehicle| format!("• *{}* - {}", vehicle.name, list_price(vehicle)))
            .collect();
        format!("Esses são os carros que temos no momento:\n\n{}", lines.join("\n"))
    }
}

/// Bullet list of candidate names
pub fn render_candidates(vehicles: &[&Vehicle]) -> String {
    vehicles
        .iter()
        .map(|vehicle| format!("• *{}*", vehicle.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Detail card for a single vehicle
pub fn render_details(vehicle: &Vehicle) -> String {
    let price = match vehicle.price {
        Some(_) => format_currency(Some(price_value(vehicle))),
        None => "Sob consulta".to_string(),
    };
    format!(
        "*Modelo:* {}\n*Ano:* {}\n*Preço:* {}\n*Descrição:* {}",
        vehicle.name,
        vehicle.year.as_deref().unwrap_or("N/A"),
        price,
        vehicle.description.as_deref().unwrap_or("N/A"),
    )
}

/// Numeric price of a vehicle; 0 when unknown or unparseable
pub fn price_value(vehicle: &Vehicle) -> f64 {
    match &vehicle.price {
        Some(Price::Amount(value)) => *value,
        Some(Price::Text(text)) => parse_currency(text),
        None => 0.0,
    }
}

fn list_price(vehicle: &Vehicle) -> String {
    match &vehicle.price {
        Some(Price::Text(text)) if !text.trim().is_empty() => text.clone(),
        Some(Price::Amount(value)) => format_currency(Some(*value)),
        _ => "Sob consulta".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Vehicle::new("Chevrolet Onix LT 1.0").with_price(Price::Text("72.900,00".into())),
            Vehicle::new("Fiat Uno Way 1.0").with_price(Price::Text("35.000,00".into())),
            Vehicle::new("Hyundai HB20 Comfort").with_price(Price::Amount(58500.0)),
            Vehicle::new("Chevrolet Onix Plus"),
        ])
    }

    fn names(found: Vec<&Vehicle>) -> Vec<&str> {
        found.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_find_all_keywords_substring() {
        let catalog = catalog();
        assert_eq!(names(catalog.find_by_name("hb20")), vec!["Hyundai HB20 Comfort"]);
        assert_eq!(names(catalog.find_by_name("Uno Way")), vec!["Fiat Uno Way 1.0"]);
    }

    #[test]
    fn test_find_any_exact_token_preserves_order() {
        let catalog = catalog();
        assert_eq!(
            names(catalog.find_by_name("quero um onix")),
            vec!["Chevrolet Onix LT 1.0", "Chevrolet Onix Plus"]
        );
    }

    #[test]
    fn test_short_input_rejected() {
        let catalog = catalog();
        assert!(catalog.find_by_name("hb").is_empty());
        assert!(catalog.find_by_name("  .. ").is_empty());
        assert!(catalog.find_by_name("a b c").is_empty());
    }

    #[test]
    fn test_no_match() {
        assert!(catalog().find_by_name("ferrari").is_empty());
    }

    #[test]
    fn test_render_list() {
        let list = catalog().render_list();
        assert!(list.starts_with("Esses são os carros que temos no momento:\n\n"));
        assert!(list.contains("• *Fiat Uno Way 1.0* - 35.000,00"));
        assert!(list.contains("• *Hyundai HB20 Comfort* - R$ 58.500,00"));
        assert!(list.contains("• *Chevrolet Onix Plus* - Sob consulta"));
    }

    #[test]
    fn test_render_empty_list() {
        assert!(Catalog::default().render_list().contains("sem carros no estoque"));
    }

    #[test]
    fn test_details_and_price() {
        let car = Vehicle::new("Fiat Uno Way 1.0")
            .with_year("2019")
            .with_price(Price::Text("R$ 35.000,00".into()));
        assert_eq!(price_value(&car), 35000.0);
        assert_eq!(
            render_details(&car),
            "*Modelo:* Fiat Uno Way 1.0\n*Ano:* 2019\n*Preço:* R$ 35.000,00\n*Descrição:* N/A"
        );
    }
}
