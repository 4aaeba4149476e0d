//! Object identifiers for manifest records
//!
//! Provides [`ObjectId`], the 24-digit hexadecimal token a project manifest
//! uses to cross-reference records, and [`IdMinter`], which mints fresh
//! tokens that are checked against the manifest buffer before use.

use crate::entity::TargetSpec;
use crate::error::InsertError;
use rand::rngs::ThreadRng;
use rand::RngCore;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of raw bytes in an [`ObjectId`]
pub const OBJECT_ID_BYTES: usize = 12;

/// Number of hexadecimal digits in the textual form of an [`ObjectId`]
pub const OBJECT_ID_DIGITS: usize = OBJECT_ID_BYTES * 2;

/// Regeneration budget before a run of colliding tokens is reported
const MAX_MINT_ATTEMPTS: usize = 16;

/// A 96-bit manifest object identifier
///
/// Printed as 24 uppercase hexadecimal digits, which is the form Xcode
/// writes. Parsing accepts either case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; OBJECT_ID_BYTES]);

impl ObjectId {
    /// Create identifier from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; OBJECT_ID_BYTES]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; OBJECT_ID_BYTES] {
        &self.0
    }

    /// Create identifier from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 12 bytes
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdError> {
        if bytes.len() != OBJECT_ID_BYTES {
            return Err(IdError::InvalidLength {
                expected: OBJECT_ID_BYTES * 2,
                actual: bytes.len() * 2,
            });
        }
        let mut arr = [0u8; OBJECT_ID_BYTES];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Draw a random identifier
    #[inline]
    #[must_use]
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; OBJECT_ID_BYTES];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Short string representation (first 8 hex digits)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode_upper(&self.0[..4])
    }

    /// Whether the textual form occurs anywhere in `buffer`
    ///
    /// Matches either case, since hand-edited manifests occasionally carry
    /// lowercase identifiers.
    #[must_use]
    pub fn occurs_in(&self, buffer: &str) -> bool {
        let upper = self.to_string();
        buffer.contains(&upper) || buffer.contains(&upper.to_ascii_lowercase())
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl FromStr for ObjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OBJECT_ID_DIGITS {
            return Err(IdError::InvalidLength {
                expected: OBJECT_ID_DIGITS,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8; OBJECT_ID_BYTES]> for ObjectId {
    fn as_ref(&self) -> &[u8; OBJECT_ID_BYTES] {
        &self.0
    }
}

/// Errors parsing an identifier
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IdError {
    /// Wrong number of hex digits
    #[error("invalid identifier length: expected {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Not hexadecimal
    #[error("invalid identifier: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Build-record identifier minted for one build target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetId {
    /// Target name as given in the plan
    pub target: String,
    /// Identifier of the new `PBXBuildFile` record for that target
    pub build_file: ObjectId,
}

/// Every identifier minted for one entity
///
/// `file_ref` is used wherever the entity is referenced, `build_files`
/// holds one build-record identifier per build target, in plan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedIds {
    /// Identity-declaration identifier
    pub file_ref: ObjectId,
    /// Build-record identifiers, one per target
    pub build_files: Vec<TargetId>,
}

impl MintedIds {
    /// Build-record identifier for a target
    #[must_use]
    pub fn build_file(&self, target: &str) -> Option<ObjectId> {
        self.build_files
            .iter()
            .find(|t| t.target == target)
            .map(|t| t.build_file)
    }

    /// All minted identifiers, file reference first
    pub fn all(&self) -> impl Iterator<Item = ObjectId> + '_ {
        std::iter::once(self.file_ref).chain(self.build_files.iter().map(|t| t.build_file))
    }
}

/// Mints identifiers that do not collide with a manifest buffer
///
/// Generic over the random source so runs can be made reproducible by
/// seeding it.
#[derive(Debug, Clone)]
pub struct IdMinter<R = ThreadRng> {
    rng: R,
    max_attempts: usize,
}

impl IdMinter<ThreadRng> {
    /// Minter backed by the thread-local generator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(rand::rng())
    }
}

impl Default for IdMinter<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> IdMinter<R> {
    /// Minter backed by an explicit generator
    #[inline]
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            max_attempts: MAX_MINT_ATTEMPTS,
        }
    }

    /// Override the regeneration budget (at least one attempt is made)
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Mint one identifier absent from `buffer` and from `taken`
    ///
    /// # Errors
    /// Returns `IdentifierCollision` if every attempt collided
    pub fn mint_one(
        &mut self,
        buffer: &str,
        taken: &[ObjectId],
        role: &str,
    ) -> Result<ObjectId, InsertError> {
        let mut last = None;
        for _ in 0..self.max_attempts {
            let candidate = ObjectId::random(&mut self.rng);
            if !taken.contains(&candidate) && !candidate.occurs_in(buffer) {
                return Ok(candidate);
            }
            tracing::debug!(id = %candidate, role, "minted identifier collides, regenerating");
            last = Some(candidate);
        }
        Err(InsertError::identifier_collision(
            last.unwrap_or(ObjectId::new([0; OBJECT_ID_BYTES])),
            role,
        ))
    }

    /// Mint (or accept pinned) identifiers for an entity and its targets
    ///
    /// Pinned identifiers are never regenerated: a pinned id that already
    /// occurs in the buffer, or that repeats another id of this run, is a
    /// collision.
    ///
    /// # Errors
    /// Returns `IdentifierCollision` on any collision
    pub fn mint(
        &mut self,
        buffer: &str,
        file_ref: Option<ObjectId>,
        targets: &[TargetSpec],
    ) -> Result<MintedIds, InsertError> {
        let mut taken: Vec<ObjectId> = Vec::with_capacity(targets.len() + 1);

        let file_ref = match file_ref {
            Some(pinned) => check_pinned(buffer, &taken, pinned, "file reference")?,
            None => self.mint_one(buffer, &taken, "file reference")?,
        };
        taken.push(file_ref);

        let mut build_files = Vec::with_capacity(targets.len());
        for target in targets {
            let role = format!("build file for target {}", target.name());
            let id = match target.build_file() {
                Some(pinned) => check_pinned(buffer, &taken, pinned, &role)?,
                None => self.mint_one(buffer, &taken, &role)?,
            };
            taken.push(id);
            build_files.push(TargetId {
                target: target.name().to_string(),
                build_file: id,
            });
        }

        Ok(MintedIds {
            file_ref,
            build_files,
        })
    }
}

fn check_pinned(
    buffer: &str,
    taken: &[ObjectId],
    id: ObjectId,
    role: &str,
) -> Result<ObjectId, InsertError> {
    if taken.contains(&id) || id.occurs_in(buffer) {
        return Err(InsertError::identifier_collision(id, role));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Generator that replays a fixed byte pattern
    struct Repeating(u8);

    impl RngCore for Repeating {
        fn next_u32(&mut self) -> u32 {
            u32::from(self.0)
        }

        fn next_u64(&mut self) -> u64 {
            u64::from(self.0)
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(self.0);
        }
    }

    fn target(name: &str, anchor: &str) -> TargetSpec {
        TargetSpec::new(name, anchor.parse().unwrap())
    }

    #[test]
    fn id_roundtrip_text() {
        let id: ObjectId = "3D9B1A301234567890123460".parse().unwrap();
        assert_eq!(id.to_string(), "3D9B1A301234567890123460");
    }

    #[test]
    fn id_accepts_lowercase() {
        let id: ObjectId = "3d9b1a301234567890123460".parse().unwrap();
        assert_eq!(id.to_string(), "3D9B1A301234567890123460");
    }

    #[test]
    fn id_rejects_wrong_length() {
        let err = "3D9B1A30".parse::<ObjectId>().unwrap_err();
        assert_eq!(
            err,
            IdError::InvalidLength {
                expected: 24,
                actual: 8
            }
        );
    }

    #[test]
    fn id_rejects_non_hex() {
        let err = "3D9B1A30123456789012346Z".parse::<ObjectId>().unwrap_err();
        assert!(matches!(err, IdError::InvalidHex(_)));
    }

    #[test]
    fn id_short() {
        let id: ObjectId = "3D9B1A301234567890123460".parse().unwrap();
        assert_eq!(id.short(), "3D9B1A30");
    }

    #[test]
    fn occurs_in_matches_either_case() {
        let id: ObjectId = "ABCDEF000000000000000001".parse().unwrap();
        assert!(id.occurs_in("x abcdef000000000000000001 y"));
        assert!(id.occurs_in("x ABCDEF000000000000000001 y"));
        assert!(!id.occurs_in("x ABCDEF000000000000000002 y"));
    }

    #[test]
    fn mint_is_reproducible_with_seed() {
        let targets = [target("App", "000000000000000000000001")];
        let a = IdMinter::with_rng(StdRng::seed_from_u64(7))
            .mint("", None, &targets)
            .unwrap();
        let b = IdMinter::with_rng(StdRng::seed_from_u64(7))
            .mint("", None, &targets)
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a.file_ref, a.build_files[0].build_file);
    }

    #[test]
    fn mint_one_per_target() {
        let targets = [
            target("App", "000000000000000000000001"),
            target("ShareExtension", "000000000000000000000002"),
        ];
        let ids = IdMinter::with_rng(StdRng::seed_from_u64(1))
            .mint("", None, &targets)
            .unwrap();
        assert_eq!(ids.build_files.len(), 2);
        assert!(ids.build_file("App").is_some());
        assert!(ids.build_file("ShareExtension").is_some());
        assert_ne!(ids.build_file("App"), ids.build_file("ShareExtension"));
        assert_eq!(ids.all().count(), 3);
    }

    #[test]
    fn mint_one_reports_exhausted_collisions() {
        let colliding = ObjectId::new([0xAB; OBJECT_ID_BYTES]);
        let buffer = format!("\t\t{colliding} /* A.swift */,\n");
        let err = IdMinter::with_rng(Repeating(0xAB))
            .with_max_attempts(3)
            .mint_one(&buffer, &[], "file reference")
            .unwrap_err();
        assert!(matches!(err, InsertError::IdentifierCollision { .. }));
    }

    #[test]
    fn mint_one_skips_taken() {
        let taken = [ObjectId::new([0x11; OBJECT_ID_BYTES])];
        let err = IdMinter::with_rng(Repeating(0x11))
            .mint_one("", &taken, "build file")
            .unwrap_err();
        assert!(err.is_collision());
    }

    #[test]
    fn pinned_id_present_in_buffer_collides() {
        let pinned: ObjectId = "3D9B1A301234567890123460".parse().unwrap();
        let buffer = "3D9B1A301234567890123460 /* Other.swift */ = {isa = PBXFileReference; };\n";
        let err = IdMinter::new().mint(buffer, Some(pinned), &[]).unwrap_err();
        assert!(err.is_collision());
    }

    #[test]
    fn pinned_ids_must_be_distinct() {
        let pinned: ObjectId = "3D9B1A301234567890123460".parse().unwrap();
        let targets = [target("App", "000000000000000000000001").with_build_file(pinned)];
        let err = IdMinter::new().mint("", Some(pinned), &targets).unwrap_err();
        assert!(err.is_collision());
    }

    #[test]
    fn pinned_ids_are_kept() {
        let file_ref: ObjectId = "3D9B1A301234567890123460".parse().unwrap();
        let build: ObjectId = "3D9B1A311234567890123461".parse().unwrap();
        let targets = [target("App", "000000000000000000000001").with_build_file(build)];
        let ids = IdMinter::new().mint("", Some(file_ref), &targets).unwrap();
        assert_eq!(ids.file_ref, file_ref);
        assert_eq!(ids.build_file("App"), Some(build));
    }
}
