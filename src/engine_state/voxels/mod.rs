//! # Voxel Data
//!
//! Everything that describes what the world is made of, independent of how it
//! is drawn:
//!
//! * **Voxel types**: `u8` ids with names and colors ([`voxel_type`])
//! * **Chunk**: a `CHUNK_DIMENSION³` array of ids plus coordinate math ([`chunk`])
//! * **World**: the shared, thread-safe map of chunks ([`world`])
//! * **Terrain**: the noise-driven fill that gives a new chunk its contents ([`terrain`])
//!
//! ## Thread Safety
//!
//! The owning thread adds, removes and edits chunks; meshing workers fill and
//! read them. Both go through the same [`world::World`] handle, which never holds
//! more than one lock at a time.

pub mod chunk;
pub mod terrain;
pub mod voxel_type;
pub mod world;
