//! Attribute facets: derivation and filtering.
//!
//! Facets are derived from purchasable variations only. An option's count is
//! the number of distinct products with at least one purchasable variation
//! exposing it. Attributes and options keep the order in which they are
//! first seen while walking products and their variations in order. An option
//! keeps the display name of its first occurrence; later names are ignored.

use crate::catalog::{Product, Variation};
use crate::i18n::LocalizedText;
use crate::ids::{AttributeId, OptionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Selected options per attribute.
pub type FacetSelection = BTreeMap<AttributeId, Vec<OptionId>>;

/// One option of a facet with its product count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetOption {
    pub id: OptionId,
    pub name: LocalizedText,
    pub count: usize,
}

/// A filterable attribute derived from a product collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttributeFilter {
    pub attribute_id: AttributeId,
    /// Name from the first variation that defined the attribute.
    pub attribute_name: LocalizedText,
    pub options: Vec<FacetOption>,
    /// Other names seen for the same attribute id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicting_names: Vec<LocalizedText>,
}

impl AttributeFilter {
    /// Look up an option by id.
    pub fn option(&self, id: &OptionId) -> Option<&FacetOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    /// Whether different products disagree on this attribute's name.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicting_names.is_empty()
    }
}

/// Derive facets from `products`.
pub fn build_facets<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<AttributeFilter> {
    let mut filters: Vec<AttributeFilter> = Vec::new();
    let mut attribute_index: HashMap<&AttributeId, usize> = HashMap::new();
    let mut option_index: HashMap<(usize, &OptionId), usize> = HashMap::new();

    for product in products {
        // (attribute, option) pairs this product has already been counted for.
        let mut counted: HashSet<(usize, &OptionId)> = HashSet::new();

        for variation in product.purchasable_variations() {
            for attr in &variation.attributes {
                let ai = match attribute_index.get(&attr.id) {
                    Some(&ai) => {
                        let filter = &mut filters[ai];
                        if filter.attribute_name != attr.name
                            && !filter.conflicting_names.contains(&attr.name)
                        {
                            tracing::warn!(
                                attribute = %attr.id,
                                product = %product.id,
                                "attribute has conflicting display names, keeping the first"
                            );
                            filter.conflicting_names.push(attr.name.clone());
                        }
                        ai
                    }
                    None => {
                        filters.push(AttributeFilter {
                            attribute_id: attr.id.clone(),
                            attribute_name: attr.name.clone(),
                            options: Vec::new(),
                            conflicting_names: Vec::new(),
                        });
                        attribute_index.insert(&attr.id, filters.len() - 1);
                        filters.len() - 1
                    }
                };

                for option in &attr.options {
                    let oi = *option_index.entry((ai, &option.id)).or_insert_with(|| {
                        filters[ai].options.push(FacetOption {
                            id: option.id.clone(),
                            name: option.name.clone(),
                            count: 0,
                        });
                        filters[ai].options.len() - 1
                    });

                    if counted.insert((ai, &option.id)) {
                        filters[ai].options[oi].count += 1;
                    }
                }
            }
        }
    }

    filters
}

/// Whether `variation` satisfies every selected attribute.
///
/// Within one attribute any selected option is enough. An attribute
/// selected with no options matches nothing.
pub fn variation_matches(variation: &Variation, selected: &FacetSelection) -> bool {
    selected.iter().all(|(attribute_id, options)| {
        variation
            .attribute(attribute_id)
            .is_some_and(|attr| options.iter().any(|o| attr.has_option(o)))
    })
}

/// Whether some purchasable variation of `product` matches the selection.
pub fn product_matches(product: &Product, selected: &FacetSelection) -> bool {
    product
        .purchasable_variations()
        .any(|v| variation_matches(v, selected))
}

/// Keep the products matching `selected`. An empty selection keeps all.
pub fn apply_facets<'a, I>(products: I, selected: &FacetSelection) -> Vec<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    if selected.is_empty() {
        return products.into_iter().collect();
    }
    products
        .into_iter()
        .filter(|p| product_matches(p, selected))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Attribute;

    fn text(s: &str) -> LocalizedText {
        LocalizedText::from([("en", s)])
    }

    fn attr(id: &str, option: &str) -> Attribute {
        Attribute::new(id, text(id)).with_option(option, text(option))
    }

    fn product(id: &str, variations: Vec<Variation>) -> Product {
        variations
            .into_iter()
            .fold(Product::new(id, text(id)), Product::with_variation)
    }

    fn stocked(id: &str, attrs: &[(&str, &str)]) -> Variation {
        attrs
            .iter()
            .fold(Variation::new(id, 1000).with_inventory(5), |v, (a, o)| {
                v.with_attribute(attr(a, o))
            })
    }

    fn selection(pairs: Vec<(&str, Vec<&str>)>) -> FacetSelection {
        pairs
            .into_iter()
            .map(|(a, opts)| {
                (
                    AttributeId::new(a),
                    opts.into_iter().map(OptionId::new).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_build_facets_empty() {
        assert!(build_facets(&Vec::<Product>::new()).is_empty());
    }

    #[test]
    fn test_build_facets_single_option() {
        let products = vec![product("a", vec![stocked("a1", &[("color", "black")])])];
        let facets = build_facets(&products);

        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].attribute_id.as_str(), "color");
        assert_eq!(facets[0].options.len(), 1);
        assert_eq!(facets[0].options[0].id.as_str(), "black");
        assert_eq!(facets[0].options[0].count, 1);
    }

    #[test]
    fn test_counts_products_not_variations() {
        let products = vec![
            product(
                "a",
                vec![
                    stocked("a1", &[("color", "black"), ("size", "s")]),
                    stocked("a2", &[("color", "black"), ("size", "m")]),
                ],
            ),
            product("b", vec![stocked("b1", &[("color", "black"), ("size", "m")])]),
        ];
        let facets = build_facets(&products);

        let color = &facets[0];
        assert_eq!(color.option(&OptionId::new("black")).unwrap().count, 2);

        let size = &facets[1];
        let order: Vec<_> = size.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(order, vec!["s", "m"]);
        assert_eq!(size.option(&OptionId::new("m")).unwrap().count, 2);
        assert_eq!(size.option(&OptionId::new("s")).unwrap().count, 1);
    }

    #[test]
    fn test_unpurchasable_variations_contribute_nothing() {
        let products = vec![product(
            "a",
            vec![
                stocked("a1", &[("color", "red")]).with_active(false),
                Variation::new("a2", 100).with_attribute(attr("color", "blue")),
            ],
        )];
        assert!(build_facets(&products).is_empty());
    }

    #[test]
    fn test_conflicting_attribute_names_are_recorded() {
        let mut renamed = stocked("b1", &[]);
        renamed.attributes.push(
            Attribute::new("color", text("Colour")).with_option("red", text("red")),
        );
        let products = vec![
            product("a", vec![stocked("a1", &[("color", "black")])]),
            product("b", vec![renamed]),
        ];
        let facets = build_facets(&products);

        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].attribute_name, text("color"));
        assert_eq!(facets[0].conflicting_names, vec![text("Colour")]);
        assert!(facets[0].has_conflicts());
    }

    #[test]
    fn test_option_keeps_first_name() {
        let mut relabeled = stocked("b1", &[]);
        relabeled.attributes.push(
            Attribute::new("color", text("color")).with_option("black", text("Onyx")),
        );
        let products = vec![
            product("a", vec![stocked("a1", &[("color", "black")])]),
            product("b", vec![relabeled]),
        ];
        let facets = build_facets(&products);

        let black = facets[0].option(&OptionId::new("black")).unwrap();
        assert_eq!(black.name, text("black"));
        assert_eq!(black.count, 2);
    }

    #[test]
    fn test_apply_facets_identity() {
        let products = vec![
            product("a", vec![stocked("a1", &[("color", "black")])]),
            product("b", vec![]),
        ];
        let kept = apply_facets(&products, &FacetSelection::new());
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].id.as_str(), "b");
    }

    #[test]
    fn test_apply_facets_single_attribute() {
        let products = vec![
            product("a", vec![stocked("a1", &[("color", "black"), ("size", "m")])]),
            product("b", vec![stocked("b1", &[("color", "blue"), ("size", "m")])]),
        ];

        let kept = apply_facets(&products, &selection(vec![("color", vec!["black"])]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_str(), "a");

        let either = apply_facets(&products, &selection(vec![("color", vec!["black", "blue"])]));
        assert_eq!(either.len(), 2);
    }

    #[test]
    fn test_apply_facets_requires_same_variation() {
        let products = vec![product(
            "a",
            vec![
                stocked("a1", &[("color", "black"), ("size", "s")]),
                stocked("a2", &[("color", "blue"), ("size", "m")]),
            ],
        )];

        let crossed = selection(vec![("color", vec!["black"]), ("size", vec!["m"])]);
        assert!(apply_facets(&products, &crossed).is_empty());

        let same = selection(vec![("color", vec!["blue"]), ("size", vec!["m"])]);
        assert_eq!(apply_facets(&products, &same).len(), 1);
    }

    #[test]
    fn test_empty_option_list_matches_nothing() {
        let products = vec![product("a", vec![stocked("a1", &[("color", "black")])])];
        assert!(apply_facets(&products, &selection(vec![("color", vec![])])).is_empty());
    }

    #[test]
    fn test_apply_skips_out_of_stock() {
        let products = vec![product(
            "a",
            vec![Variation::new("a1", 100).with_attribute(attr("color", "black"))],
        )];
        assert!(apply_facets(&products, &selection(vec![("color", vec!["black"])])).is_empty());
    }
}
