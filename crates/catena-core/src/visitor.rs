// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Depth-first traversal of a parameter's sub-parameters and array elements.

use std::sync::Arc;

use crate::device::{Device, Param, ParamKind};

/// Callback invoked at every node `traverse_params` visits.
///
/// The device never tracks visited nodes — cycles in the descriptor graph
/// are the device's responsibility to prevent, not the visitor's.
pub trait ParamVisitor {
    /// Called once per parameter (and once per array element, with `path`
    /// already carrying the element's index).
    fn visit(&mut self, param: &Arc<dyn Param>, path: &str);

    /// Called once for an array parameter, before its elements are visited.
    fn visit_array(&mut self, param: &Arc<dyn Param>, path: &str, size: usize) {
        let _ = (param, path, size);
    }
}

/// Depth-first walk starting at `param` (addressed by `path`): visits the
/// param, then its array elements (if any), then each named sub-parameter
/// resolved through `dev.get_param`. A sub-parameter that no longer exists
/// on the device (`NOT_FOUND`) is skipped silently, not an error.
pub fn traverse_params(
    param: &Arc<dyn Param>,
    path: &str,
    dev: &dyn Device,
    visitor: &mut dyn ParamVisitor,
) {
    visitor.visit(param, path);

    if let Some(size) = param.array_len() {
        visitor.visit_array(param, path, size);
        for i in 0..size {
            let child_path = format!("{path}/{i}");
            if let Ok(child) = dev.get_param(&child_path) {
                traverse_params(&child, &child_path, dev, visitor);
            }
        }
    }

    if param.kind() == ParamKind::Command {
        return;
    }

    for name in param.descriptor().sub_param_names() {
        let child_path = format!("{path}/{name}");
        if let Ok(child) = dev.get_param(&child_path) {
            traverse_params(&child, &child_path, dev, visitor);
        }
    }
}

#[cfg(test)]
#[path = "visitor_tests.rs"]
mod tests;
