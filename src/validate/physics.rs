use crate::{
    data::{BodyJson, MotionJson, MotionType, ShapeJson, ShapeRecord, ShapeType, Tapered},
    validate::{check_finite, check_non_negative, check_positive, Validation},
};

pub fn validate_shape(shape: &ShapeJson) -> Validation {
    let mut v = Validation::new();
    let ty = match shape.kind.parse::<ShapeType>() {
        Ok(ty) => ty,
        Err(_) => return Validation::error(format!("Invalid shape type: {}", shape.kind)),
    };
    for payload in shape.payloads().filter(|p| *p != ty) {
        v.push_error(format!("shape of type {ty} carries a {payload} payload"));
    }
    match shape.resolve() {
        Ok(record) => v.absorb(validate_shape_record(&record)),
        Err(e) => v.push_error(e.to_string()),
    }
    v
}

/// Numeric checks on an already-resolved shape.
pub fn validate_shape_record(record: &ShapeRecord) -> Validation {
    let mut v = Validation::new();
    match record {
        ShapeRecord::Box { size } => {
            check_finite(&mut v, "size", size.as_slice());
            for (axis, s) in ["x", "y", "z"].into_iter().zip(size.iter()) {
                check_positive(&mut v, &format!("size.{axis}"), *s);
            }
        }
        ShapeRecord::Sphere { radius } => check_positive(&mut v, "radius", *radius),
        ShapeRecord::Capsule(Tapered {
            height,
            radius_top,
            radius_bottom,
        }) => {
            // a zero-height capsule is a sphere
            check_non_negative(&mut v, "height", *height);
            check_positive(&mut v, "radiusTop", *radius_top);
            check_positive(&mut v, "radiusBottom", *radius_bottom);
        }
        ShapeRecord::Cylinder(Tapered {
            height,
            radius_top,
            radius_bottom,
        }) => {
            check_positive(&mut v, "height", *height);
            // one zero radius makes a cone
            check_non_negative(&mut v, "radiusTop", *radius_top);
            check_non_negative(&mut v, "radiusBottom", *radius_bottom);
            if *radius_top == 0.0 && *radius_bottom == 0.0 {
                v.push_error("cylinder radii must not both be 0");
            }
        }
        ShapeRecord::Convex { mesh } | ShapeRecord::Trimesh { mesh } => {
            if *mesh < 0 {
                v.push_error(format!("mesh index must not be negative (got {mesh})"));
            }
        }
    }
    v
}

pub fn validate_motion(motion: &MotionJson) -> Validation {
    let mut v = Validation::new();
    let ty = match motion.kind.parse::<MotionType>() {
        Ok(ty) => ty,
        Err(e) => return Validation::error(e.to_string()),
    };
    let mass = motion.mass.resolve(crate::data::DEFAULT_MASS);
    if ty == MotionType::Dynamic {
        check_positive(&mut v, "mass", mass);
    } else {
        check_non_negative(&mut v, "mass", mass);
    }
    if let Some(com) = motion.center_of_mass.as_option() {
        check_finite(&mut v, "centerOfMass", com);
    }
    // static & kinematic bodies ignore velocities & inertia
    if ty != MotionType::Dynamic {
        return v;
    }
    for (field, value) in [
        ("linearVelocity", motion.linear_velocity),
        ("angularVelocity", motion.angular_velocity),
    ] {
        if let Some(value) = value.as_option() {
            check_finite(&mut v, field, value);
        }
    }
    if let Some(inertia) = motion.inertia_diagonal.as_option() {
        for i in inertia {
            check_non_negative(&mut v, "inertiaDiagonal", *i);
        }
    }
    if let Some(q) = motion.inertia_orientation.as_option() {
        let norm_sq: f32 = q.iter().map(|c| c * c).sum();
        if !(norm_sq > f32::EPSILON) || !norm_sq.is_finite() {
            v.push_error(format!("inertiaOrientation {q:?} is not a rotation"));
        }
    }
    v
}

/// `shape_count`, if known, bounds the collider & trigger shape indices.
pub fn validate_body(body: &BodyJson, shape_count: Option<usize>) -> Validation {
    let mut v = Validation::new();
    if let Some(motion) = &body.motion {
        v.absorb(validate_motion(motion));
    }
    let check_shape = |v: &mut Validation, field: &str, shape: i64| {
        let valid = usize::try_from(shape)
            .map_or(false, |s| shape_count.map_or(true, |count| s < count));
        if !valid {
            v.push_error(format!("{field} {shape} is not a valid shape index"));
        }
    };
    if let Some(collider) = &body.collider {
        check_shape(&mut v, "collider.shape", collider.shape);
    }
    if let Some(trigger) = &body.trigger {
        match (trigger.shape, &trigger.nodes) {
            (Some(shape), None) => check_shape(&mut v, "trigger.shape", shape),
            (None, Some(nodes)) => {
                if nodes.iter().any(|n| *n < 0) {
                    v.push_error(format!("trigger.nodes {nodes:?} contains a negative index"));
                }
            }
            (Some(_), Some(_)) => v.push_error("trigger must not specify both shape and nodes"),
            (None, None) => v.push_error("trigger must specify either shape or nodes"),
        }
    }
    v
}
