//! Color mapping for site types and site states

use crate::graph::{MapSite, SiteState};
use crate::terrain::SiteType;

/// RGBA color type
pub type SiteColor = [f32; 4];

fn rgb(r: u8, g: u8, b: u8) -> SiteColor {
    [f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0, 1.0]
}

pub const FOREST_GREEN: SiteColor = [0.133, 0.545, 0.133, 1.0];
pub const LIGHT_GREEN: SiteColor = [0.565, 0.933, 0.565, 1.0];
pub const RED: SiteColor = [1.0, 0.0, 0.0, 1.0];
pub const ORANGE: SiteColor = [1.0, 0.647, 0.0, 1.0];
pub const BLACK: SiteColor = [0.0, 0.0, 0.0, 1.0];
pub const DARK_GRAY: SiteColor = [0.663, 0.663, 0.663, 1.0];
pub const YELLOW: SiteColor = [1.0, 1.0, 0.0, 1.0];
pub const WHITE: SiteColor = [1.0, 1.0, 1.0, 1.0];

/// State colors in priority order; the first flag a site carries wins
///
/// `HOVER` is not listed: it overrides everything.
pub const STATE_PRECEDENCE: [(SiteState, SiteColor); 6] = [
    (SiteState::CURRENT, FOREST_GREEN),
    (SiteState::VISITED, LIGHT_GREEN),
    (SiteState::SEARCH_START, RED),
    (SiteState::SEARCH_GOAL, ORANGE),
    (SiteState::WALL, BLACK),
    (SiteState::PATH, DARK_GRAY),
];

/// Trait for mapping site types to colors
pub trait ColorMapper<T> {
    /// Map a site type to an RGBA color
    fn map_color(&self, site_type: &T) -> SiteColor;
}

/// Default palette for SiteType
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicColorMapper;

impl ColorMapper<SiteType> for BasicColorMapper {
    fn map_color(&self, site_type: &SiteType) -> SiteColor {
        match site_type {
            SiteType::Ocean => rgb(68, 68, 122),
            SiteType::Beach => rgb(160, 144, 119),
            SiteType::Lowland => rgb(136, 170, 85),
            SiteType::Highland => rgb(51, 119, 85),
            SiteType::Mountain | SiteType::Unknown => WHITE,
        }
    }
}

/// Custom color mapper that allows setting colors for each site type
#[derive(Debug, Clone)]
pub struct CustomColorMapper {
    pub ocean: SiteColor,
    pub beach: SiteColor,
    pub lowland: SiteColor,
    pub highland: SiteColor,
    pub mountain: SiteColor,
    pub unknown: SiteColor,
}

impl Default for CustomColorMapper {
    fn default() -> Self {
        let basic = BasicColorMapper;
        Self {
            ocean: basic.map_color(&SiteType::Ocean),
            beach: basic.map_color(&SiteType::Beach),
            lowland: basic.map_color(&SiteType::Lowland),
            highland: basic.map_color(&SiteType::Highland),
            mountain: basic.map_color(&SiteType::Mountain),
            unknown: basic.map_color(&SiteType::Unknown),
        }
    }
}

impl ColorMapper<SiteType> for CustomColorMapper {
    fn map_color(&self, site_type: &SiteType) -> SiteColor {
        match site_type {
            SiteType::Ocean => self.ocean,
            SiteType::Beach => self.beach,
            SiteType::Lowland => self.lowland,
            SiteType::Highland => self.highland,
            SiteType::Mountain => self.mountain,
            SiteType::Unknown => self.unknown,
        }
    }
}

/// Color a site is drawn with: hover, then state precedence, then terrain
pub fn display_color<C>(site: &MapSite, mapper: &C) -> SiteColor
where
    C: ColorMapper<SiteType> + ?Sized,
{
    state_color(site.state()).unwrap_or_else(|| mapper.map_color(&site.site_type()))
}

/// Color forced by the state flags alone, if any
pub fn state_color(state: SiteState) -> Option<SiteColor> {
    if state.contains(SiteState::HOVER) {
        return Some(YELLOW);
    }
    STATE_PRECEDENCE
        .iter()
        .find(|(flag, _)| state.contains(*flag))
        .map(|(_, color)| *color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_color_mapper() {
        let mapper = BasicColorMapper;

        let ocean = mapper.map_color(&SiteType::Ocean);
        assert_eq!(ocean[3], 1.0);
        assert!(ocean[2] > ocean[0]); // Blue over red

        assert_eq!(mapper.map_color(&SiteType::Mountain), WHITE);
        assert_eq!(mapper.map_color(&SiteType::Unknown), WHITE);
    }

    #[test]
    fn test_custom_color_mapper() {
        let custom = CustomColorMapper {
            ocean: [0.0, 0.2, 0.5, 1.0],
            ..Default::default()
        };
        assert_eq!(custom.map_color(&SiteType::Ocean), [0.0, 0.2, 0.5, 1.0]);
        assert_eq!(
            custom.map_color(&SiteType::Lowland),
            BasicColorMapper.map_color(&SiteType::Lowland)
        );
    }

    #[test]
    fn test_state_precedence() {
        assert_eq!(state_color(SiteState::NONE), None);
        assert_eq!(state_color(SiteState::PATH | SiteState::WALL), Some(BLACK));
        assert_eq!(state_color(SiteState::VISITED | SiteState::SEARCH_START), Some(LIGHT_GREEN));
        assert_eq!(state_color(SiteState::CURRENT | SiteState::VISITED), Some(FOREST_GREEN));
        assert_eq!(state_color(SiteState::SEARCH_GOAL | SiteState::PATH), Some(ORANGE));
        assert_eq!(state_color(SiteState::HOVER | SiteState::CURRENT), Some(YELLOW));
        // Unlisted flags fall through to terrain
        assert_eq!(state_color(SiteState::FRONTIER | SiteState::IMPASSABLE), None);
    }
}
