mod earth;
mod frames;
mod observer;
mod sun;
mod transform;

pub use earth::{EarthModel, Geodetic};
pub use frames::{
    fixed_to_enu, fixed_to_inertial_position, inertial_to_fixed_position,
    inertial_to_fixed_velocity, sidereal_angle,
};
pub use observer::Observer;
pub use sun::sun_position_km;
pub use transform::{CoordinateTransform, LookAngles};
