// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors raised by map surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// A paint update targeted a layer that is not on the surface.
    #[error("Layer '{0}' does not exist")]
    UnknownLayer(String),
    /// A paint property does not apply to the layer's kind.
    #[error("Paint property '{property}' does not apply to layer '{layer_id}'")]
    PaintMismatch {
        /// The layer.
        layer_id: String,
        /// The property name.
        property: &'static str,
    },
}
