//! # Core Module
//!
//! Concurrency primitives shared by the rest of the engine.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `WeakMtResource`: Non-owning handle to an `MtResource`, used for back-references
//!
//! ## Usage
//! ```rust
//! use voxel_mesh_engine::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//!
//! let weak = counter.downgrade();
//! assert!(weak.upgrade().is_some());
//! ```

pub mod mt_resource;

pub use mt_resource::{MtResource, WeakMtResource};
