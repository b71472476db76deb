//! Ad-size tables. `AD_SIZES` holds the named placements used when deriving a full ad
//! set from one master image (sides rounded to multiples of 8); `STANDARD_SIZES` holds
//! the plain IAB sizes used for sliding-window crops.
use serde::Serialize;

use crate::error::Result;
use crate::types::{PanAxis, TargetRect};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdCategory {
    Desktop,
    Mobile,
}

impl AdCategory {
    pub fn dir_name(&self) -> &'static str {
        match self {
            AdCategory::Desktop => "desktop",
            AdCategory::Mobile => "mobile",
        }
    }
}

impl std::fmt::Display for AdCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub struct AdSize {
    pub category: AdCategory,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

impl AdSize {
    const fn new(category: AdCategory, name: &'static str, width: u32, height: u32) -> Self {
        Self {
            category,
            name,
            width,
            height,
        }
    }

    pub fn target(&self) -> Result<TargetRect> {
        TargetRect::new(self.width as i64, self.height as i64)
    }

    pub fn pan_axis(&self) -> PanAxis {
        PanAxis::for_size(self.width, self.height)
    }

    pub fn pan_arrow(&self) -> &'static str {
        self.pan_axis().arrow()
    }
}

pub const AD_SIZES: &[AdSize] = &[
    AdSize::new(AdCategory::Desktop, "medium_rectangle", 304, 248), // 300x250
    AdSize::new(AdCategory::Desktop, "leaderboard", 728, 88),       // 728x90
    AdSize::new(AdCategory::Desktop, "wide_skyscraper", 160, 600),
    AdSize::new(AdCategory::Desktop, "half_page", 304, 600), // 300x600
    AdSize::new(AdCategory::Desktop, "large_rectangle", 336, 280),
    AdSize::new(AdCategory::Desktop, "billboard", 968, 248), // 970x250
    AdSize::new(AdCategory::Desktop, "large_leaderboard", 968, 88), // 970x90
    AdSize::new(AdCategory::Desktop, "square", 248, 248),    // 250x250
    AdSize::new(AdCategory::Mobile, "mobile_leaderboard", 320, 48), // 320x50
    AdSize::new(AdCategory::Mobile, "large_mobile_banner", 320, 104), // 320x100
    AdSize::new(AdCategory::Mobile, "small_square", 200, 200),
    AdSize::new(AdCategory::Mobile, "interstitial_portrait", 320, 480),
    AdSize::new(AdCategory::Mobile, "interstitial_landscape", 480, 320),
];

pub const STANDARD_SIZES: &[(u32, u32)] = &[
    (300, 250),
    (728, 90),
    (160, 600),
    (320, 50),
    (300, 600),
    (336, 280),
    (970, 250),
    (250, 250),
    (120, 600),
    (468, 60),
    (234, 60),
    (120, 240),
];

pub fn find_ad_size(name: &str) -> Option<&'static AdSize> {
    AD_SIZES.iter().find(|s| s.name == name)
}
