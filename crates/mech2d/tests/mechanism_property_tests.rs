//! 机构树性质测试
//!
//! 用 proptest 验证两条结构不变量：get-or-create 的幂等性（重复创建时
//! 首次参数生效）和树的单调增长（节点名集合只增不减）。

use mech2d::Mechanism2d;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

proptest! {
    /// 任意 Root 创建序列下：同名首次参数生效，名集合单调增长
    #[test]
    fn prop_root_get_or_create_first_wins(
        ops in prop::collection::vec(("[a-e]", 0.0..100.0f64, 0.0..100.0f64), 1..40)
    ) {
        let mech = Mechanism2d::new(8.0, 8.0);
        let mut first: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();

        for (name, x, y) in &ops {
            let root = mech.root(name, *x, *y).unwrap();
            let expected = *first.entry(name.clone()).or_insert((*x, *y));
            prop_assert_eq!(root.position(), expected);

            seen.insert(name.clone());
            let names: BTreeSet<String> = mech.root_names().into_iter().collect();
            prop_assert_eq!(&names, &seen);
        }
    }

    /// 任意 Ligament 创建序列下：同名首次参数生效，子节点集合只增不减
    #[test]
    fn prop_ligament_tree_grows_monotonically(
        ops in prop::collection::vec(("[a-e]", 0.0..10.0f64), 1..40)
    ) {
        let mech = Mechanism2d::new(8.0, 8.0);
        let root = mech.root("base", 0.0, 0.0).unwrap();
        let mut first: BTreeMap<String, f64> = BTreeMap::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();

        for (name, length) in &ops {
            let seg = root.ligament(name, *length, 0.0, 1.0, "#FF0000").unwrap();
            let expected = *first.entry(name.clone()).or_insert(*length);
            prop_assert_eq!(seg.length(), expected);

            seen.insert(name.clone());
            let names: BTreeSet<String> = root.child_names().into_iter().collect();
            prop_assert_eq!(&names, &seen);
        }
    }
}
