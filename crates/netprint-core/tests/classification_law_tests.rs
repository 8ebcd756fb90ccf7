//! Property laws of component evaluation and service-type classification

use netprint_core::component::{ComponentBit, ComponentKey, ComponentMatch};
use netprint_core::{
    classify, evaluate, Classification, Data, ServiceComponent, ServiceTypeCatalog,
    ServiceTypeDefinition, Value,
};
use proptest::prelude::*;

const NAMES: [&str; 5] = ["L2VNI", "IR", "PIM", "ARPSuppress", "AGW"];

fn arb_data() -> impl Strategy<Value = Data> {
    prop::collection::btree_map("[a-z]{1,6}", (-1000i64..1000).prop_map(Value::Int), 2..6)
}

fn arb_definition() -> impl Strategy<Value = ServiceTypeDefinition> {
    (
        "[A-Z]{1,5}",
        prop::collection::btree_map(
            prop::sample::select(NAMES.to_vec()).prop_map(String::from),
            any::<bool>(),
            1..5,
        ),
    )
        .prop_map(|(name, components)| ServiceTypeDefinition { name, components })
}

fn arb_bitmap() -> impl Strategy<Value = Vec<ComponentBit>> {
    prop::collection::vec(any::<bool>(), NAMES.len()).prop_map(|bits| {
        NAMES
            .iter()
            .zip(bits)
            .map(|(name, value)| ComponentBit {
                name: name.to_string(),
                value,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn component_holds_iff_every_key_holds(
        data in arb_data(),
        victim in any::<prop::sample::Index>(),
        remove in any::<bool>(),
    ) {
        let component = ServiceComponent {
            name: "C".to_string(),
            keys: data
                .iter()
                .map(|(name, value)| ComponentKey {
                    name: name.clone(),
                    value: value.clone(),
                    match_type: ComponentMatch::Equal,
                })
                .collect(),
        };
        prop_assert!(component.holds(&data));

        let field = victim.get(&component.keys).name.clone();
        let mut broken = data.clone();
        if remove {
            broken.remove(&field);
        } else {
            broken.insert(field, Value::from("changed"));
        }

        prop_assert!(!component.holds(&broken));
        let bitmap = evaluate(std::slice::from_ref(&component), &broken);
        prop_assert!(!bitmap[0].value);
    }

    #[test]
    fn setting_a_wanted_component_never_lowers_score(
        definition in arb_definition(),
        bitmap in arb_bitmap(),
        index in 0..NAMES.len(),
    ) {
        prop_assume!(definition.components.get(NAMES[index]) != Some(&false));

        let before = definition.score(&bitmap);
        let mut raised = bitmap.clone();
        raised[index].value = true;

        prop_assert!(definition.score(&raised) >= before);
    }

    #[test]
    fn all_false_bitmap_is_not_exist(
        definitions in prop::collection::vec(arb_definition(), 0..6),
        width in 0..NAMES.len(),
    ) {
        let catalog = ServiceTypeCatalog { family: "VNI".to_string(), definitions };
        let bitmap: Vec<ComponentBit> = NAMES[..width]
            .iter()
            .map(|name| ComponentBit { name: name.to_string(), value: false })
            .collect();

        prop_assert_eq!(classify(&bitmap, &catalog), Classification::NotExist);
    }

    #[test]
    fn winner_has_the_highest_score(
        definitions in prop::collection::vec(arb_definition(), 1..6),
        bitmap in arb_bitmap(),
    ) {
        let definitions: Vec<ServiceTypeDefinition> = definitions
            .into_iter()
            .enumerate()
            .map(|(i, d)| ServiceTypeDefinition { name: format!("T{}", i), ..d })
            .collect();
        prop_assume!(bitmap.iter().any(|b| b.value));
        let catalog = ServiceTypeCatalog { family: "VNI".to_string(), definitions };

        match classify(&bitmap, &catalog) {
            Classification::Defined(name) => {
                let winner = catalog.definitions.iter().find(|d| d.name == name).unwrap();
                let best = winner.score(&bitmap).unwrap();
                for definition in &catalog.definitions {
                    prop_assert!(definition.score(&bitmap).map_or(true, |s| s <= best));
                }
            }
            Classification::NotDefined => {
                prop_assert!(catalog.definitions.iter().all(|d| d.score(&bitmap).is_none()));
            }
            Classification::NotExist => prop_assert!(false, "bitmap has a true bit"),
        }
    }
}
