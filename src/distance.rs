// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Mean radius of Earth, in kilometers.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6371.0088;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in kilometers.
///
/// Live tracking sums many of these short hops, so the computation itself
/// is carried out in `f64` and only the result is narrowed.
pub fn earth_distance(lat1: f32, lon1: f32, lat2: f32, lon2: f32) -> f32 {
    let (phi1, phi2) = ((lat1 as f64).to_radians(), (lat2 as f64).to_radians());
    let d_phi = phi2 - phi1;
    let d_lambda = (lon2 as f64 - lon1 as f64).to_radians();

    let a = (d_phi * 0.5).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda * 0.5).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS * c) as f32
}
