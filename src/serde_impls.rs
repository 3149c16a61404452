//! `serde` support for both trees. A tree serializes as the sequence of its values in ascending
//! order and deserializes by inserting the values of a sequence in the order they appear.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::{boxed, linked};

/// Collects a sequence into any tree that can be built from an iterator.
struct TreeVisitor<C, T>(PhantomData<(C, T)>);

impl<'de, C, T> Visitor<'de> for TreeVisitor<C, T>
where
    C: Extend<T> + Default,
    T: Deserialize<'de>,
{
    type Value = C;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence of tree values")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut tree = C::default();
        while let Some(value) = seq.next_element()? {
            tree.extend(Some(value));
        }
        Ok(tree)
    }
}

macro_rules! impl_serde {
    ($module:ident) => {
        impl<T> Serialize for $module::Tree<T>
        where
            T: Serialize,
        {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.collect_seq(self.iter())
            }
        }

        impl<'de, T> Deserialize<'de> for $module::Tree<T>
        where
            T: Deserialize<'de> + Ord,
        {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_seq(TreeVisitor(PhantomData))
            }
        }
    };
}

impl_serde!(linked);
impl_serde!(boxed);
