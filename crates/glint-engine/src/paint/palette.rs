//! Badwolf color scheme (Steve Losh), opaque.

use super::Rgba;

pub const PLAIN: Rgba = Rgba::rgb(0.972549, 0.964706, 0.949020);
pub const SNOW: Rgba = Rgba::rgb(1.000000, 1.000000, 1.000000);
pub const COAL: Rgba = Rgba::rgb(0.000000, 0.000000, 0.000000);

pub const BRIGHT_GRAVEL: Rgba = Rgba::rgb(0.850980, 0.807843, 0.764706);
pub const LIGHT_GRAVEL: Rgba = Rgba::rgb(0.600000, 0.560784, 0.517647);
pub const GRAVEL: Rgba = Rgba::rgb(0.521569, 0.498039, 0.470588);
pub const MEDIUM_GRAVEL: Rgba = Rgba::rgb(0.400000, 0.392157, 0.384314);
pub const DEEP_GRAVEL: Rgba = Rgba::rgb(0.270588, 0.254902, 0.231373);
pub const DEEPER_GRAVEL: Rgba = Rgba::rgb(0.207843, 0.196078, 0.176471);
pub const DARK_GRAVEL: Rgba = Rgba::rgb(0.141176, 0.137255, 0.129412);
pub const BLACK_GRAVEL: Rgba = Rgba::rgb(0.109804, 0.105882, 0.101961);
pub const BLACKEST_GRAVEL: Rgba = Rgba::rgb(0.078431, 0.078431, 0.074510);

pub const DALES_PALE: Rgba = Rgba::rgb(0.980392, 0.870588, 0.243137);
pub const DIRTY_BLONDE: Rgba = Rgba::rgb(0.956863, 0.811765, 0.525490);
pub const TAFFY: Rgba = Rgba::rgb(1.000000, 0.172549, 0.294118);
pub const SALTWATER_TAFFY: Rgba = Rgba::rgb(0.549020, 1.000000, 0.729412);
pub const TARDIS: Rgba = Rgba::rgb(0.039216, 0.615686, 1.000000);
pub const ORANGE: Rgba = Rgba::rgb(1.000000, 0.654902, 0.141176);
pub const LIME: Rgba = Rgba::rgb(0.682353, 0.933333, 0.000000);
pub const DRESS: Rgba = Rgba::rgb(1.000000, 0.619608, 0.721569);
pub const TOFFEE: Rgba = Rgba::rgb(0.721569, 0.533333, 0.325490);
pub const COFFEE: Rgba = Rgba::rgb(0.780392, 0.568627, 0.356863);
pub const DARK_ROAST: Rgba = Rgba::rgb(0.533333, 0.388235, 0.247059);

/// Every palette entry with its scheme name, in declaration order.
pub const ALL: [(&str, Rgba); 23] = [
    ("plain", PLAIN),
    ("snow", SNOW),
    ("coal", COAL),
    ("brightgravel", BRIGHT_GRAVEL),
    ("lightgravel", LIGHT_GRAVEL),
    ("gravel", GRAVEL),
    ("mediumgravel", MEDIUM_GRAVEL),
    ("deepgravel", DEEP_GRAVEL),
    ("deepergravel", DEEPER_GRAVEL),
    ("darkgravel", DARK_GRAVEL),
    ("blackgravel", BLACK_GRAVEL),
    ("blackestgravel", BLACKEST_GRAVEL),
    ("dalespale", DALES_PALE),
    ("dirtyblonde", DIRTY_BLONDE),
    ("taffy", TAFFY),
    ("saltwatertaffy", SALTWATER_TAFFY),
    ("tardis", TARDIS),
    ("orange", ORANGE),
    ("lime", LIME),
    ("dress", DRESS),
    ("toffee", TOFFEE),
    ("coffee", COFFEE),
    ("darkroast", DARK_ROAST),
];

/// Looks up a palette color by its scheme name (e.g. `"tardis"`).
pub fn by_name(name: &str) -> Option<Rgba> {
    ALL.iter().find(|(n, _)| *n == name).map(|&(_, c)| c)
}
