// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::testing::wildcard_fixture_device;

struct CollectingVisitor {
    paths: Vec<String>,
}

impl ParamVisitor for CollectingVisitor {
    fn visit(&mut self, _param: &Arc<dyn Param>, path: &str) {
        self.paths.push(path.to_owned());
    }
}

#[test]
fn visits_every_descendant_exactly_once() {
    let dev = wildcard_fixture_device();
    let root = dev.get_param("/test").expect("root");
    let mut visitor = CollectingVisitor { paths: Vec::new() };
    traverse_params(&root, "/test", &dev, &mut visitor);

    let expected = [
        "/test",
        "/test/param1",
        "/test/basic",
        "/test/basic/param2",
        "/test/basic/deeper",
        "/test/basic/deeper/param3",
        "/test/array",
        "/test/array/0",
        "/test/array/0/subparam",
        "/test/array/1",
        "/test/array/1/subparam",
    ];
    assert_eq!(visitor.paths.len(), expected.len());
    for oid in expected {
        assert_eq!(visitor.paths.iter().filter(|p| p.as_str() == oid).count(), 1, "{oid}");
    }
}

#[test]
fn visit_array_is_invoked_for_array_params() {
    let dev = wildcard_fixture_device();
    let array = dev.get_param("/test/array").expect("array param");

    struct ArrayVisitor {
        sizes: Vec<usize>,
    }
    impl ParamVisitor for ArrayVisitor {
        fn visit(&mut self, _param: &Arc<dyn Param>, _path: &str) {}
        fn visit_array(&mut self, _param: &Arc<dyn Param>, _path: &str, size: usize) {
            self.sizes.push(size);
        }
    }

    let mut visitor = ArrayVisitor { sizes: Vec::new() };
    traverse_params(&array, "/test/array", &dev, &mut visitor);
    assert_eq!(visitor.sizes, vec![2]);
}

#[test]
fn skips_children_that_no_longer_exist() {
    use crate::testing::DeviceBuilder;
    use crate::device::ParamKind;

    let dev = DeviceBuilder::default()
        .param("/p", ParamKind::Scalar, crate::device::Value::Empty, None)
        .build();
    let p = dev.get_param("/p").expect("param");
    let mut visitor = CollectingVisitor { paths: Vec::new() };
    traverse_params(&p, "/p", &dev, &mut visitor);
    assert_eq!(visitor.paths, vec!["/p".to_owned()]);
}
