//! Recommendation response rendering.
//!
//! Turns filtered catalog results into user-facing text. Rendering is
//! deterministic: the same resolved set and product list always produce the
//! same response, which keeps conversation tests stable.

use apparel_catalog::{AttributeKey, AttributeValue, ProductRecord};

use crate::fusion::ResolvedAttributes;

/// Renders the final recommendation message for a turn.
pub trait ResponseRenderer: Send + Sync {
    fn render(&self, resolved: &ResolvedAttributes, products: &[ProductRecord]) -> String;
}

/// Deterministic template-based renderer.
pub struct TemplateRenderer;

impl TemplateRenderer {
    fn vibe_summary(resolved: &ResolvedAttributes) -> String {
        let mut parts = Vec::new();
        for key in [AttributeKey::Style, AttributeKey::Season, AttributeKey::Occasion] {
            if let Some(AttributeValue::Scalar(value)) = resolved.get(key) {
                parts.push(value.to_lowercase());
            }
        }
        parts.join(" ")
    }

    fn budget_note(resolved: &ResolvedAttributes, product: &ProductRecord) -> Option<String> {
        let budget = resolved.get(AttributeKey::Budget)?.as_number()?;
        if product.price <= budget * 0.8 {
            Some(format!(
                "It comes in at ${:.2}, comfortably under your ${:.0} budget.",
                product.price, budget
            ))
        } else {
            None
        }
    }

    fn product_line(product: &ProductRecord) -> String {
        format!("- {} (${:.2}): {}", product.name, product.price, product.description())
    }
}

impl ResponseRenderer for TemplateRenderer {
    fn render(&self, resolved: &ResolvedAttributes, products: &[ProductRecord]) -> String {
        let vibe = Self::vibe_summary(resolved);

        match products {
            [] => {
                let mut message = String::from(
                    "I couldn't find anything matching all of that. ",
                );
                if resolved.is_present(AttributeKey::Budget) {
                    message.push_str(
                        "Raising the budget a little or relaxing the fabric or fit might help.",
                    );
                } else {
                    message.push_str("Relaxing the fabric or fit might help.");
                }
                message
            }
            [product] => {
                let mut message = if vibe.is_empty() {
                    format!(
                        "I found the perfect match: {}, {}.",
                        product.name,
                        product.description()
                    )
                } else {
                    format!(
                        "For your {} look, I found the perfect match: {}, {}.",
                        vibe,
                        product.name,
                        product.description()
                    )
                };
                if let Some(note) = Self::budget_note(resolved, product) {
                    message.push(' ');
                    message.push_str(&note);
                }
                message
            }
            many => {
                let mut message = if vibe.is_empty() {
                    format!("Here are {} pieces that fit what you described:\n", many.len())
                } else {
                    format!("Here are {} pieces for your {} look:\n", many.len(), vibe)
                };
                for product in many {
                    message.push_str(&Self::product_line(product));
                    message.push('\n');
                }
                message.push_str("The list is sorted by price, lowest first.");
                message
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::{AttributeCandidate, SourceTier};
    use apparel_catalog::Category;

    fn product(name: &str, price: f64) -> ProductRecord {
        ProductRecord {
            product_id: name.to_string(),
            name: name.to_string(),
            category: Category::Dress,
            price,
            available_sizes: "S,M,L".to_string(),
            fit: Some("Relaxed".to_string()),
            fabric: Some("Linen".to_string()),
            sleeve_length: None,
            color_or_print: None,
            occasion: None,
            neckline: None,
            length: None,
            pant_type: None,
        }
    }

    fn resolved_with(pairs: &[(AttributeKey, AttributeValue)]) -> ResolvedAttributes {
        let mut set = ResolvedAttributes::new();
        for (key, value) in pairs {
            set.apply(&AttributeCandidate::new(
                *key,
                value.clone(),
                SourceTier::UserPreference,
                1.0,
            ));
        }
        set
    }

    #[test]
    fn test_empty_results_message() {
        let resolved = resolved_with(&[(AttributeKey::Budget, 50.0.into())]);
        let message = TemplateRenderer.render(&resolved, &[]);
        assert!(message.contains("couldn't find anything"));
        assert!(message.contains("Raising the budget"));
    }

    #[test]
    fn test_single_product_mentions_vibe() {
        let resolved = resolved_with(&[
            (AttributeKey::Season, "summer".into()),
            (AttributeKey::Occasion, "brunch".into()),
        ]);
        let message = TemplateRenderer.render(&resolved, &[product("Breezy Wrap", 68.0)]);
        assert!(message.contains("summer brunch"));
        assert!(message.contains("Breezy Wrap"));
    }

    #[test]
    fn test_budget_note_when_well_under() {
        let resolved = resolved_with(&[(AttributeKey::Budget, 100.0.into())]);
        let message = TemplateRenderer.render(&resolved, &[product("Breezy Wrap", 68.0)]);
        assert!(message.contains("under your $100 budget"));

        // Near the budget: no note.
        let message = TemplateRenderer.render(&resolved, &[product("Breezy Wrap", 95.0)]);
        assert!(!message.contains("budget."));
    }

    #[test]
    fn test_multiple_products_listed() {
        let resolved = ResolvedAttributes::new();
        let products = [product("A", 40.0), product("B", 60.0), product("C", 80.0)];
        let message = TemplateRenderer.render(&resolved, &products);
        assert!(message.contains("3 pieces"));
        assert!(message.contains("- A ($40.00)"));
        assert!(message.contains("sorted by price"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let resolved = resolved_with(&[(AttributeKey::Style, "casual".into())]);
        let products = [product("A", 40.0), product("B", 60.0)];
        assert_eq!(
            TemplateRenderer.render(&resolved, &products),
            TemplateRenderer.render(&resolved, &products)
        );
    }
}
