use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::face::BrushFace;

/// Bit set of smart tag indices a face currently carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TagMask(pub u64);

impl TagMask {
    pub const EMPTY: TagMask = TagMask(0);

    pub fn bit(index: u32) -> Self {
        TagMask(1u64.checked_shl(index).unwrap_or(0))
    }

    pub fn contains(&self, other: TagMask) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: TagMask) {
        self.0 |= other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// The ways a smart tag can recognize a face.
#[derive(Debug, Clone, PartialEq)]
pub enum TagMatcher {
    /// Case-insensitive glob over the material name; `*` and `?` are wildcards.
    MaterialName(String),
    /// Any of these surface parameters is declared by the face's material.
    SurfaceParm(BTreeSet<String>),
    /// Any of these bits is set in the resolved surface contents.
    ContentFlags(i32),
    /// Any of these bits is set in the resolved surface flags.
    SurfaceFlags(i32),
}

impl TagMatcher {
    pub fn matches(&self, face: &BrushFace) -> bool {
        match self {
            TagMatcher::MaterialName(pattern) => glob_matches(pattern, face.attributes().material_name()),
            TagMatcher::SurfaceParm(names) => face
                .material()
                .is_some_and(|material| !material.surface_parms().is_disjoint(names)),
            TagMatcher::ContentFlags(mask) => face.resolved_surface_contents() & mask != 0,
            TagMatcher::SurfaceFlags(mask) => face.resolved_surface_flags() & mask != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmartTag {
    pub name: String,
    pub index: u32,
    pub matcher: TagMatcher,
}

impl SmartTag {
    pub fn new(name: impl Into<String>, index: u32, matcher: TagMatcher) -> Self {
        Self {
            name: name.into(),
            index,
            matcher,
        }
    }

    pub fn mask(&self) -> TagMask {
        TagMask::bit(self.index)
    }
}

fn glob_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let text: Vec<char> = text.to_lowercase().chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                // let the last star swallow one more character
                Some((star, consumed)) => {
                    p = star + 1;
                    t = consumed + 1;
                    backtrack = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob() {
        assert!(glob_matches("*", ""));
        assert!(glob_matches("trigger", "TRIGGER"));
        assert!(glob_matches("sky*", "sky1"));
        assert!(glob_matches("*clip*", "common/clip_player"));
        assert!(glob_matches("b?ck", "back"));
        assert!(!glob_matches("b?ck", "bck"));
        assert!(!glob_matches("sky*", "water_sky"));
        assert!(glob_matches("a*b*c", "axxbyyc"));
        assert!(!glob_matches("a*b*c", "axxbyy"));
    }

    #[test]
    fn test_tag_mask() {
        let mut mask = TagMask::EMPTY;
        assert!(mask.is_empty());
        mask.insert(TagMask::bit(3));
        assert!(mask.contains(TagMask::bit(3)));
        assert!(!mask.contains(TagMask::bit(4)));
        assert!(!mask.contains(TagMask::EMPTY));
        assert_eq!(TagMask::bit(64), TagMask::EMPTY);
    }
}
