//! Asset identifiers.
//!
//! A logical id only means something inside its kind: artwork 5 and gump 5
//! are unrelated.

use std::fmt;

/// The six asset families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKind {
    /// Land tiles and item art.
    Artwork,
    /// Terrain texture maps.
    Texmap,
    /// Mobile animations.
    Animation,
    /// UI overlays.
    Gump,
    /// Fixed-width bitmap fonts.
    AsciiFont,
    /// Variable-width 1bpp fonts.
    UnicodeFont,
}

impl AssetKind {
    /// Every kind, in factory construction order.
    pub const ALL: [Self; 6] = [
        Self::Artwork,
        Self::Texmap,
        Self::Animation,
        Self::Gump,
        Self::AsciiFont,
        Self::UnicodeFont,
    ];

    /// Short lowercase name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Artwork => "artwork",
            Self::Texmap => "texmap",
            Self::Animation => "animation",
            Self::Gump => "gump",
            Self::AsciiFont => "ascii-font",
            Self::UnicodeFont => "unicode-font",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A (kind, logical id) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetKey {
    /// Which factory the id belongs to.
    pub kind: AssetKind,
    /// Logical id inside that factory.
    pub id: u32,
}

impl AssetKey {
    /// Creates a key.
    #[inline]
    #[must_use]
    pub const fn new(kind: AssetKind, id: u32) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Artwork ids: land tiles occupy the first `LAND_COUNT` slots, items follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtworkId {
    /// A land tile graphic.
    Land(u16),
    /// An item (static) graphic.
    Item(u16),
}

impl ArtworkId {
    /// Number of land tile slots at the start of the art index.
    pub const LAND_COUNT: u32 = 0x4000;

    /// The logical artwork id.
    #[inline]
    #[must_use]
    pub const fn logical(self) -> u32 {
        match self {
            Self::Land(id) => id as u32 & (Self::LAND_COUNT - 1),
            Self::Item(id) => Self::LAND_COUNT + id as u32,
        }
    }

    /// Splits a logical id back into land or item.
    #[inline]
    #[must_use]
    pub fn from_logical(id: u32) -> Option<Self> {
        if id < Self::LAND_COUNT {
            u16::try_from(id).ok().map(Self::Land)
        } else {
            u16::try_from(id - Self::LAND_COUNT).ok().map(Self::Item)
        }
    }
}

/// Animation ids are composed of body, action and direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationId {
    /// Body graphic.
    pub body: u16,
    /// Action (walk, run, attack...).
    pub action: u8,
    /// Facing, 0..=4 in the file (mirrored for the other three).
    pub direction: u8,
}

impl AnimationId {
    /// Actions per body for high-detail monsters.
    pub const HIGH_ACTIONS: u32 = 22;
    /// Actions per body for low-detail animals.
    pub const LOW_ACTIONS: u32 = 13;
    /// Actions per body for people and equipment.
    pub const PEOPLE_ACTIONS: u32 = 35;
    /// Stored directions per action.
    pub const DIRECTIONS: u32 = 5;

    /// Creates an animation id.
    #[must_use]
    pub const fn new(body: u16, action: u8, direction: u8) -> Self {
        Self {
            body,
            action,
            direction,
        }
    }

    /// Actions stored for this body's group.
    #[must_use]
    pub const fn actions_for_body(self) -> u32 {
        if self.body < 200 {
            Self::HIGH_ACTIONS
        } else if self.body < 400 {
            Self::LOW_ACTIONS
        } else {
            Self::PEOPLE_ACTIONS
        }
    }

    /// Index of the first entry of this body in `anim.idx`.
    ///
    /// Each body takes `actions * DIRECTIONS` entries, so bodies below 200
    /// use 110, 200..400 use 65 and the rest use 175.
    #[must_use]
    pub fn body_base(self) -> u32 {
        let body = u32::from(self.body);
        let span = self.actions_for_body() * Self::DIRECTIONS;
        if body < 200 {
            body * span
        } else if body < 400 {
            200 * Self::HIGH_ACTIONS * Self::DIRECTIONS + (body - 200) * span
        } else {
            200 * (Self::HIGH_ACTIONS + Self::LOW_ACTIONS) * Self::DIRECTIONS
                + (body - 400) * span
        }
    }

    /// The logical animation id, i.e. the entry in `anim.idx`.
    ///
    /// `None` if the action is past the body group's action count; such an
    /// id would land on the next body's entries.
    #[must_use]
    pub fn logical(self) -> Option<u32> {
        let action = u32::from(self.action);
        if action >= self.actions_for_body() {
            return None;
        }
        Some(
            self.body_base()
                + action * Self::DIRECTIONS
                + u32::from(self.direction).min(Self::DIRECTIONS - 1),
        )
    }
}
