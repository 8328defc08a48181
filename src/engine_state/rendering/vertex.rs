//! Vertex data structures for voxel rendering.
//!
//! Every vertex of a chunk mesh is packed into a single `u32` so a full chunk
//! mesh can be uploaded as-is and unpacked by the vertex shader.

use cgmath::Point3;

/// A vertex in the voxel rendering pipeline.
///
/// # Memory Layout
/// Bits of the packed word, least significant first:
/// - `0..5`: x, chunk-local (corner inclusive, so up to width)
/// - `5..14`: y, chunk-local
/// - `14..19`: z, chunk-local
/// - `19..21`: face-local UV corner index (0-3)
/// - `21..26`: atlas cell u
/// - `26..30`: atlas cell v
/// - `30..32`: directional shade code
///
/// Total size: 4 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    packed: u32,
}

const X_BITS: u32 = 0x1F;
const Y_BITS: u32 = 0x1FF;
const Z_BITS: u32 = 0x1F;
const CORNER_BITS: u32 = 0x3;
const U_BITS: u32 = 0x1F;
const V_BITS: u32 = 0xF;
const SHADE_BITS: u32 = 0x3;

const Y_SHIFT: u32 = 5;
const Z_SHIFT: u32 = 14;
const CORNER_SHIFT: u32 = 19;
const U_SHIFT: u32 = 21;
const V_SHIFT: u32 = 26;
const SHADE_SHIFT: u32 = 30;

impl Vertex {
    /// Packs a vertex. Fields wider than their bit range are truncated.
    ///
    /// # Arguments
    /// * `position` - Chunk-local cube corner position
    /// * `corner` - Face-local UV corner index
    /// * `atlas` - Atlas cell `(u, v)` of the face texture
    /// * `shade` - Directional shade code of the face
    pub fn new(position: Point3<u32>, corner: u8, atlas: (u8, u8), shade: u8) -> Self {
        let packed = (position.x & X_BITS)
            | ((position.y & Y_BITS) << Y_SHIFT)
            | ((position.z & Z_BITS) << Z_SHIFT)
            | ((corner as u32 & CORNER_BITS) << CORNER_SHIFT)
            | ((atlas.0 as u32 & U_BITS) << U_SHIFT)
            | ((atlas.1 as u32 & V_BITS) << V_SHIFT)
            | ((shade as u32 & SHADE_BITS) << SHADE_SHIFT);
        Vertex { packed }
    }

    /// The packed word as uploaded to the GPU.
    pub fn packed(&self) -> u32 {
        self.packed
    }

    /// Chunk-local corner position.
    pub fn position(&self) -> Point3<u32> {
        Point3::new(
            self.packed & X_BITS,
            (self.packed >> Y_SHIFT) & Y_BITS,
            (self.packed >> Z_SHIFT) & Z_BITS,
        )
    }

    /// Face-local UV corner index.
    pub fn corner(&self) -> u8 {
        ((self.packed >> CORNER_SHIFT) & CORNER_BITS) as u8
    }

    /// Atlas cell of the face texture.
    pub fn atlas(&self) -> (u8, u8) {
        (
            ((self.packed >> U_SHIFT) & U_BITS) as u8,
            ((self.packed >> V_SHIFT) & V_BITS) as u8,
        )
    }

    /// Directional shade code.
    pub fn shade(&self) -> u8 {
        ((self.packed >> SHADE_SHIFT) & SHADE_BITS) as u8
    }
}
