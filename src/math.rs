use bevy::math::{Ray3d, Vec3};

/// Toroidal wrap: a coordinate past one bound reappears at the opposite bound.
/// Values exactly on a bound are left alone.
pub fn wrap(value: f32, bound: f32) -> f32 {
    if value > bound {
        -bound
    } else if value < -bound {
        bound
    } else {
        value
    }
}

pub fn wrap_vec3(v: Vec3, bounds: Vec3) -> Vec3 {
    Vec3::new(wrap(v.x, bounds.x), wrap(v.y, bounds.y), wrap(v.z, bounds.z))
}

/// Distance from `point` to the half-line described by `ray`.
/// Points behind the origin measure to the origin itself.
pub fn distance_to_ray(ray: &Ray3d, point: Vec3) -> f32 {
    let to_point = point - ray.origin;
    let t = to_point.dot(*ray.direction);
    if t < 0.0 {
        return to_point.length();
    }
    point.distance(ray.get_point(t))
}

/// Linear blend of two RGB triples, `t` in [0, 1].
pub fn lerp_rgb(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from * (1.0 - t) + to * t
}

/// One frame of exponential decay of `current` toward `target`.
pub fn decay_toward(current: Vec3, target: Vec3, factor: f32) -> Vec3 {
    current + (target - current) * factor
}
