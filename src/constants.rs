/// Standard gravitational parameter of the Earth (km^3/s^2).
pub const MU_EARTH: f64 = 398_600.4418;

/// Mean Earth radius used by the spherical Earth model (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Lowest perigee altitude an element set may imply before it is rejected (km).
pub const MIN_PERIGEE_ALTITUDE_KM: f64 = 100.0;

// WGS-84 constants
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.00669437999014;

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

/// Second zonal harmonic of the geopotential (normalised to WGS84_A_KM).
pub const J2: f64 = 1.082_626_68e-3;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub const AU_KM: f64 = 149_597_870.7;
