//! Symbolic values accepted by enum and flag attributes.
//!
//! Text manifests spell these as names (`singleTop`, `signature|privileged`)
//! where a compiled manifest would carry the integer.

type Symbols = &'static [(&'static str, i64)];

const LAUNCH_MODE: Symbols = &[
    ("standard", 0),
    ("singleTop", 1),
    ("singleTask", 2),
    ("singleInstance", 3),
    ("singleInstancePerTask", 4),
];

const SCREEN_ORIENTATION: Symbols = &[
    ("unspecified", -1),
    ("landscape", 0),
    ("portrait", 1),
    ("user", 2),
    ("behind", 3),
    ("sensor", 4),
    ("nosensor", 5),
    ("sensorLandscape", 6),
    ("sensorPortrait", 7),
    ("reverseLandscape", 8),
    ("reversePortrait", 9),
    ("fullSensor", 10),
    ("userLandscape", 11),
    ("userPortrait", 12),
    ("fullUser", 13),
    ("locked", 14),
];

const CONFIG_CHANGES: Symbols = &[
    ("mcc", 0x0001),
    ("mnc", 0x0002),
    ("locale", 0x0004),
    ("touchscreen", 0x0008),
    ("keyboard", 0x0010),
    ("keyboardHidden", 0x0020),
    ("navigation", 0x0040),
    ("orientation", 0x0080),
    ("screenLayout", 0x0100),
    ("uiMode", 0x0200),
    ("screenSize", 0x0400),
    ("smallestScreenSize", 0x0800),
    ("density", 0x1000),
    ("layoutDirection", 0x2000),
    ("colorMode", 0x4000),
    ("grammaticalGender", 0x8000),
    ("fontWeightAdjustment", 0x1000_0000),
    ("fontScale", 0x4000_0000),
];

const RECREATE_ON_CONFIG_CHANGES: Symbols = &[("mcc", 0x0001), ("mnc", 0x0002)];

const SOFT_INPUT_MODE: Symbols = &[
    ("stateUnspecified", 0x00),
    ("stateUnchanged", 0x01),
    ("stateHidden", 0x02),
    ("stateAlwaysHidden", 0x03),
    ("stateVisible", 0x04),
    ("stateAlwaysVisible", 0x05),
    ("adjustUnspecified", 0x00),
    ("adjustResize", 0x10),
    ("adjustPan", 0x20),
    ("adjustNothing", 0x30),
];

const DOCUMENT_LAUNCH_MODE: Symbols = &[
    ("none", 0),
    ("intoExisting", 1),
    ("always", 2),
    ("never", 3),
];

const PERSISTABLE_MODE: Symbols = &[
    ("persistRootOnly", 0),
    ("persistNever", 1),
    ("persistAcrossReboots", 2),
];

const LOCK_TASK_MODE: Symbols = &[
    ("normal", 0),
    ("never", 1),
    ("always", 2),
    ("if_whitelisted", 3),
    ("if_allowlisted", 3),
];

const UI_OPTIONS: Symbols = &[("none", 0), ("splitActionBarWhenNarrow", 1)];

const COLOR_MODE: Symbols = &[("default", 0), ("wideColorGamut", 1), ("hdr", 2)];

const ROTATION_ANIMATION: Symbols = &[
    ("rotate", 0),
    ("crossfade", 1),
    ("jumpcut", 2),
    ("seamless", 3),
];

const PROTECTION_LEVEL: Symbols = &[
    ("normal", 0),
    ("dangerous", 1),
    ("signature", 2),
    ("signatureOrSystem", 3),
    ("internal", 4),
    ("privileged", 0x10),
    ("system", 0x10),
    ("development", 0x20),
    ("appop", 0x40),
    ("pre23", 0x80),
    ("installer", 0x100),
    ("verifier", 0x200),
    ("preinstalled", 0x400),
    ("setup", 0x800),
    ("instant", 0x1000),
    ("runtime", 0x2000),
    ("oem", 0x4000),
    ("vendorPrivileged", 0x8000),
    ("textClassifier", 0x1_0000),
    ("configurator", 0x8_0000),
    ("incidentReportApprover", 0x10_0000),
    ("appPredictor", 0x20_0000),
    ("companion", 0x80_0000),
    ("retailDemo", 0x100_0000),
    ("recents", 0x200_0000),
    ("role", 0x400_0000),
    ("knownSigner", 0x800_0000),
];

const PERMISSION_FLAGS: Symbols = &[
    ("costsMoney", 0x1),
    ("removed", 0x2),
    ("hardRestricted", 0x4),
    ("softRestricted", 0x8),
    ("immutablyRestricted", 0x10),
    ("installerExemptIgnored", 0x20),
];

const PERMISSION_GROUP_FLAGS: Symbols = &[("personalInfo", 0x1)];

const FOREGROUND_SERVICE_TYPE: Symbols = &[
    ("dataSync", 0x01),
    ("mediaPlayback", 0x02),
    ("phoneCall", 0x04),
    ("location", 0x08),
    ("connectedDevice", 0x10),
    ("mediaProjection", 0x20),
    ("camera", 0x40),
    ("microphone", 0x80),
    ("health", 0x100),
    ("remoteMessaging", 0x200),
    ("systemExempted", 0x400),
    ("shortService", 0x800),
    ("specialUse", 0x4000_0000),
];

const GWP_ASAN_MODE: Symbols = &[("default", -1), ("never", 0), ("always", 1)];

const MEMTAG_MODE: Symbols = &[("default", -1), ("off", 0), ("async", 1), ("sync", 2)];

const GRAVITY: Symbols = &[
    ("top", 0x30),
    ("bottom", 0x50),
    ("left", 0x03),
    ("right", 0x05),
    ("center_vertical", 0x10),
    ("fill_vertical", 0x70),
    ("center_horizontal", 0x01),
    ("fill_horizontal", 0x07),
    ("center", 0x11),
    ("fill", 0x77),
    ("clip_vertical", 0x80),
    ("clip_horizontal", 0x08),
    ("start", 0x0080_0003),
    ("end", 0x0080_0005),
];

/// Symbol table for an Android-namespace attribute, if it has one
fn symbols(attribute: &str) -> Option<Symbols> {
    let table = match attribute {
        "launchMode" => LAUNCH_MODE,
        "screenOrientation" => SCREEN_ORIENTATION,
        "configChanges" => CONFIG_CHANGES,
        "recreateOnConfigChanges" => RECREATE_ON_CONFIG_CHANGES,
        "windowSoftInputMode" => SOFT_INPUT_MODE,
        "documentLaunchMode" => DOCUMENT_LAUNCH_MODE,
        "persistableMode" => PERSISTABLE_MODE,
        "lockTaskMode" => LOCK_TASK_MODE,
        "uiOptions" => UI_OPTIONS,
        "colorMode" => COLOR_MODE,
        "rotationAnimation" => ROTATION_ANIMATION,
        "protectionLevel" => PROTECTION_LEVEL,
        "permissionFlags" => PERMISSION_FLAGS,
        "permissionGroupFlags" => PERMISSION_GROUP_FLAGS,
        "foregroundServiceType" => FOREGROUND_SERVICE_TYPE,
        "gwpAsanMode" => GWP_ASAN_MODE,
        "memtagMode" => MEMTAG_MODE,
        "gravity" => GRAVITY,
        _ => return None,
    };
    Some(table)
}

/// Resolve `name|name|...` against the attribute's symbol table.
///
/// Returns `None` when the attribute has no table or any part is unknown.
pub fn lookup(attribute: &str, text: &str) -> Option<i32> {
    let table = symbols(attribute)?;
    let mut value: i64 = 0;
    for part in text.split('|') {
        let part = part.trim();
        let (_, bits) = table.iter().find(|(name, _)| *name == part)?;
        value |= *bits;
    }
    Some(value as i32)
}

/// Parse an integer literal the way the resource compiler does: decimal,
/// `0x` hex, or a `#` color.
pub fn parse_int_literal(text: &str) -> Option<i32> {
    let text = text.trim();
    if let Some(color) = text.strip_prefix('#') {
        return parse_color(color);
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from(u32::from_str_radix(hex, 16).ok()?)
    } else {
        digits.parse::<i64>().ok()?
    };

    let value = if negative { -magnitude } else { magnitude };
    if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
        return None;
    }
    Some(value as i32)
}

/// `#RGB`, `#ARGB`, `#RRGGBB` and `#AARRGGBB`
fn parse_color(hex: &str) -> Option<i32> {
    let raw = u32::from_str_radix(hex, 16).ok()?;
    let expand = |v: u32| v * 0x11;
    let argb = match hex.len() {
        3 => 0xff00_0000 | expand((raw >> 8) & 0xf) << 16 | expand((raw >> 4) & 0xf) << 8 | expand(raw & 0xf),
        4 => {
            expand((raw >> 12) & 0xf) << 24
                | expand((raw >> 8) & 0xf) << 16
                | expand((raw >> 4) & 0xf) << 8
                | expand(raw & 0xf)
        }
        6 => 0xff00_0000 | raw,
        8 => raw,
        _ => return None,
    };
    Some(argb as i32)
}
