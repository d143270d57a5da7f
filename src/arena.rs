//! Fixed scratch memory shared by the active sensor algorithm.
//!
//! The arena is allocated once and never grows. `partition` lays out named
//! regions at fixed, double-word aligned offsets and hands back an
//! `ArenaToken` tagged with a generation counter. Every partition bumps the
//! generation, so a token held by a previous algorithm stops working the
//! moment another algorithm partitions the arena. Access goes through
//! `regions_mut`, which checks the token and carves disjoint slices without
//! allocating.

use bytemuck::Pod;
use zeroize::Zeroize;

use crate::error::SensorError;

/// Build-time scratch capacity in bytes.
pub const SCRATCH_CAPACITY: usize = 4096;

/// Alignment of every region start (double-word).
pub const SCRATCH_ALIGN: usize = 8;

/// Upper bound on regions in one layout.
pub const MAX_REGIONS: usize = 8;

#[repr(C, align(8))]
struct AlignedBlock([u8; SCRATCH_CAPACITY]);

/// One region an algorithm asks for during `setup`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionRequest {
    pub name: &'static str,
    pub len: usize,
}

impl RegionRequest {
    pub const fn bytes(name: &'static str, len: usize) -> Self {
        Self { name, len }
    }

    /// Region sized for `count` elements of `T`.
    pub const fn of<T: Pod>(name: &'static str, count: usize) -> Self {
        Self {
            name,
            len: count * std::mem::size_of::<T>(),
        }
    }
}

/// A placed region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub offset: usize,
    pub len: usize,
}

/// Result of a successful partition: regions in request order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScratchLayout {
    regions: [Region; MAX_REGIONS],
    count: usize,
    total: usize,
}

impl ScratchLayout {
    pub fn regions(&self) -> &[Region] {
        &self.regions[..self.count]
    }

    pub fn region(&self, name: &str) -> Option<Region> {
        self.regions().iter().copied().find(|r| r.name == name)
    }

    /// Bytes spanned by the layout including alignment padding.
    pub fn total(&self) -> usize {
        self.total
    }
}

/// Capability to touch the arena, valid until the next partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaToken {
    generation: u64,
}

impl ArenaToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ----------------------------------------------------------------------------
// ScratchArena
// ----------------------------------------------------------------------------

pub struct ScratchArena {
    storage: Box<AlignedBlock>,
    generation: u64,
    used: usize,
}

impl ScratchArena {
    pub fn new() -> Self {
        Self {
            storage: Box::new(AlignedBlock([0u8; SCRATCH_CAPACITY])),
            generation: 0,
            used: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        SCRATCH_CAPACITY
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bytes spanned by the current holder's layout.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Lay out `request` and hand the arena to a new holder.
    ///
    /// On failure nothing changes: the previous holder keeps a valid token.
    /// On success all bytes are zeroed and earlier tokens go stale.
    pub fn partition(
        &mut self,
        request: &[RegionRequest],
    ) -> Result<(ArenaToken, ScratchLayout), SensorError> {
        if request.len() > MAX_REGIONS {
            return Err(SensorError::InvalidArgument("too many scratch regions"));
        }

        let mut regions = [Region::default(); MAX_REGIONS];
        let mut offset = 0usize;
        for (slot, req) in regions.iter_mut().zip(request) {
            let start = align_up(offset);
            let end = start.checked_add(req.len).ok_or(SensorError::ScratchExhausted {
                requested: usize::MAX,
                capacity: SCRATCH_CAPACITY,
            })?;
            *slot = Region {
                name: req.name,
                offset: start,
                len: req.len,
            };
            offset = end;
        }

        if offset > SCRATCH_CAPACITY {
            return Err(SensorError::ScratchExhausted {
                requested: offset,
                capacity: SCRATCH_CAPACITY,
            });
        }

        self.storage.0[..].zeroize();
        self.generation = self.generation.wrapping_add(1);
        self.used = offset;

        Ok((
            ArenaToken {
                generation: self.generation,
            },
            ScratchLayout {
                regions,
                count: request.len(),
                total: offset,
            },
        ))
    }

    /// Invalidate the current holder without handing the arena to anyone.
    pub fn release(&mut self) {
        self.storage.0[..].zeroize();
        self.generation = self.generation.wrapping_add(1);
        self.used = 0;
    }

    /// Check a token without borrowing any region.
    pub fn validate(&self, token: &ArenaToken) -> Result<(), SensorError> {
        if token.generation != self.generation {
            return Err(SensorError::StaleArena);
        }
        Ok(())
    }

    /// Disjoint mutable views of all `N` regions of `layout`, in order.
    pub fn regions_mut<const N: usize>(
        &mut self,
        token: &ArenaToken,
        layout: &ScratchLayout,
    ) -> Result<[&mut [u8]; N], SensorError> {
        self.validate(token)?;
        if N != layout.count {
            return Err(SensorError::InvalidArgument("scratch region count mismatch"));
        }

        let regions = &layout.regions;
        let mut rest: &mut [u8] = &mut self.storage.0[..];
        let mut cursor = 0usize;
        Ok(std::array::from_fn(|i| {
            let region = regions[i];
            let tail = std::mem::take(&mut rest);
            let (_, tail) = tail.split_at_mut(region.offset - cursor);
            let (head, tail) = tail.split_at_mut(region.len);
            cursor = region.offset + region.len;
            rest = tail;
            head
        }))
    }
}

impl Default for ScratchArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScratchArena {
    fn drop(&mut self) {
        self.storage.0[..].zeroize();
    }
}

#[inline]
const fn align_up(offset: usize) -> usize {
    (offset + SCRATCH_ALIGN - 1) & !(SCRATCH_ALIGN - 1)
}

/// Reinterpret a region as a slice of `T`. Regions are double-word aligned
/// and sized by `RegionRequest::of`, so the cast cannot fail for them.
#[inline]
pub fn cast_region<T: Pod>(bytes: &mut [u8]) -> &mut [T] {
    bytemuck::cast_slice_mut(bytes)
}
