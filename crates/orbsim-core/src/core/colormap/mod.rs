//! # Colormap Module
//!
//! Turns sampled fields into renderable color: the phase of each complex value selects a
//! hue from a cyclic colormap and its normalized magnitude selects an opacity.
//!
//! - [`cyclic`] - Periodic color tables, built in or loaded from TOML
//! - [`opacity`] - Monotone magnitude-to-opacity curves
//! - [`mapper`] - [`mapper::PhaseColormapper`] and the resulting [`mapper::ColorField`]

pub mod cyclic;
pub mod mapper;
pub mod opacity;
