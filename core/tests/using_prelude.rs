//! Exercises the crate through `pqdif_core::prelude` alone, the way a
//! downstream consumer typically would.

use pqdif_core::prelude::*;
use uuid::Uuid;

fn tag(n: u128) -> Identifier {
    Identifier::from_uuid(Uuid::from_u128(n))
}

#[test]
fn build_a_small_tree_via_the_prelude() {
    let mut root = Collection::new(tag(0));

    root.get_or_add_scalar(tag(1), PhysicalType::UnsignedInteger1)
        .set(ScalarValue::UnsignedInteger1(42));

    let values = root
        .get_or_add_vector(tag(2), PhysicalType::Real4);
    values.resize(2);
    values.set(0, ScalarValue::Real4(1.0));
    values.set(1, ScalarValue::Real4(2.0));

    assert_eq!(root.len(), 2);
    assert_eq!(
        root.get_scalar_by_tag(tag(1)).unwrap().get_u1().unwrap(),
        42
    );
    assert_eq!(root.get_vector_by_tag(tag(2)).unwrap().len(), 2);

    let element: Element = Scalar::new(tag(3), PhysicalType::Boolean1).into();
    assert_eq!(element.tag(), tag(3));
}
