//! [`SpatialProbe`] implementation backed by the Rapier query pipeline.

use crate::probe::{ProbeResult, ProbeShape, QueryParams, SpatialProbe};
use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::parry::query::{ShapeCastOptions, ShapeCastStatus};
use rapier3d::prelude::*;

/// Rays shorter than this report a miss.
const MIN_PROBE_LENGTH: f32 = 1.0e-4;

fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn make_shape(shape: ProbeShape) -> SharedShape {
    match shape {
        ProbeShape::Sphere { radius } => SharedShape::ball(radius.max(MIN_PROBE_LENGTH)),
        ProbeShape::Capsule {
            radius,
            half_height,
        } => {
            let radius = radius.max(MIN_PROBE_LENGTH);
            SharedShape::capsule_y((half_height - radius).max(0.0), radius)
        }
    }
}

impl PhysicsWorld {
    fn ray_hit(
        &self,
        start: Vec3,
        delta: Vec3,
        handle: ColliderHandle,
        hit: RayIntersection,
    ) -> ProbeResult {
        let point = start + delta * hit.time_of_impact;
        let start_penetrating = hit.time_of_impact <= 0.0;
        ProbeResult {
            blocking: true,
            time: hit.time_of_impact,
            distance: delta.length() * hit.time_of_impact,
            location: point,
            impact_point: point,
            normal: from_vector(&hit.normal).normalize_or_zero(),
            start_penetrating,
            collider: Some(handle),
            tags: self.tags_of(handle),
        }
    }
}

impl SpatialProbe for PhysicsWorld {
    fn raycast(&self, start: Vec3, end: Vec3, params: &QueryParams) -> ProbeResult {
        let delta = end - start;
        if delta.length() < MIN_PROBE_LENGTH {
            return ProbeResult::miss(start, end);
        }

        // The direction is not normalized so the time of impact is the fraction of the ray.
        let ray = Ray::new(to_point(start), to_vector(delta));
        let predicate = |handle: ColliderHandle, _: &Collider| !params.is_ignored(handle);
        let filter = QueryFilter::default()
            .groups(params.profile.query_groups())
            .predicate(&predicate);

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                1.0,
                true,
                filter,
            )
            .map(|(handle, hit)| self.ray_hit(start, delta, handle, hit))
            .unwrap_or_else(|| ProbeResult::miss(start, end))
    }

    fn raycast_all(&self, start: Vec3, end: Vec3, params: &QueryParams) -> Vec<ProbeResult> {
        let delta = end - start;
        if delta.length() < MIN_PROBE_LENGTH {
            return Vec::new();
        }

        let ray = Ray::new(to_point(start), to_vector(delta));
        let predicate = |handle: ColliderHandle, _: &Collider| !params.is_ignored(handle);
        let filter = QueryFilter::default()
            .groups(params.profile.query_groups())
            .predicate(&predicate);

        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            1.0,
            true,
            filter,
            |handle, hit: RayIntersection| {
                hits.push(self.ray_hit(start, delta, handle, hit));
                true
            },
        );

        hits.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
        hits
    }

    fn sweep(
        &self,
        shape: ProbeShape,
        start: Vec3,
        end: Vec3,
        params: &QueryParams,
    ) -> ProbeResult {
        let delta = end - start;
        let predicate = |handle: ColliderHandle, _: &Collider| !params.is_ignored(handle);
        let filter = QueryFilter::default()
            .groups(params.profile.query_groups())
            .predicate(&predicate);

        let shape_pos = Isometry::translation(start.x, start.y, start.z);
        let rapier_shape = make_shape(shape);
        let options = ShapeCastOptions {
            max_time_of_impact: 1.0,
            target_distance: 0.0,
            stop_at_penetration: false,
            compute_impact_geometry_on_penetration: true,
        };

        let Some((handle, hit)) = self.query_pipeline.cast_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &to_vector(delta),
            &*rapier_shape,
            options,
            filter,
        ) else {
            return ProbeResult::miss(start, end);
        };

        let time = hit.time_of_impact.clamp(0.0, 1.0);
        let location = start + delta * time;
        let impact_point = Vec3::new(hit.witness1.x, hit.witness1.y, hit.witness1.z);
        let mut normal = from_vector(&hit.normal1).normalize_or_zero();
        // Orient the normal toward the swept shape.
        if normal.dot(location - impact_point) < 0.0 {
            normal = -normal;
        }
        let start_penetrating = hit.status == ShapeCastStatus::PenetratingOrWithinTargetDist;
        if start_penetrating && normal == Vec3::ZERO {
            normal = (location - impact_point).normalize_or(Vec3::Y);
        }

        ProbeResult {
            blocking: true,
            time,
            distance: delta.length() * time,
            location,
            impact_point,
            normal,
            start_penetrating,
            collider: Some(handle),
            tags: self.tags_of(handle),
        }
    }

    fn overlap_test(&self, shape: ProbeShape, position: Vec3, params: &QueryParams) -> bool {
        let predicate = |handle: ColliderHandle, _: &Collider| !params.is_ignored(handle);
        let filter = QueryFilter::default()
            .groups(params.profile.query_groups())
            .predicate(&predicate);

        let (radius, half_segment) = match shape {
            ProbeShape::Sphere { radius } => (radius, 0.0),
            ProbeShape::Capsule {
                radius,
                half_height,
            } => (radius, (half_height - radius).max(0.0)),
        };
        let ball = SharedShape::ball(radius.max(MIN_PROBE_LENGTH));
        let bottom = position - Vec3::Y * half_segment;

        // A capsule is a ball swept along its core segment. Testing it that way
        // also catches cores that pass right through thin or deeply embedded solids.
        let bottom_pos = Isometry::translation(bottom.x, bottom.y, bottom.z);
        let touching = self
            .query_pipeline
            .intersection_with_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &bottom_pos,
                &*ball,
                filter,
            )
            .is_some();
        if touching || half_segment <= 0.0 {
            return touching;
        }

        let options = ShapeCastOptions {
            max_time_of_impact: 1.0,
            target_distance: 0.0,
            stop_at_penetration: true,
            compute_impact_geometry_on_penetration: false,
        };
        self.query_pipeline
            .cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &bottom_pos,
                &to_vector(Vec3::Y * (2.0 * half_segment)),
                &*ball,
                options,
                filter,
            )
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{SemanticTag, TagSet};

    fn world_with_floor_and_wall() -> (PhysicsWorld, ColliderHandle) {
        let mut world = PhysicsWorld::new();
        // Floor top at y = 0.
        world.add_static_cuboid(Vec3::new(0.0, -10.0, 0.0), 0.0, Vec3::new(1000.0, 10.0, 1000.0));
        // Ice-tagged wall with its front face at z = -100.
        let wall = world.add_tagged_cuboid(
            Vec3::new(0.0, 100.0, -110.0),
            0.0,
            Vec3::new(200.0, 100.0, 10.0),
            TagSet::from(SemanticTag::Ice),
        );
        world.update_query_pipeline();
        (world, wall)
    }

    #[test]
    fn raycast_reports_tags_and_normal() {
        let (world, wall) = world_with_floor_and_wall();
        let params = QueryParams::default();
        let hit = world.raycast(
            Vec3::new(0.0, 50.0, 0.0),
            Vec3::new(0.0, 50.0, -200.0),
            &params,
        );
        assert!(hit.is_valid_blocking_hit());
        assert_eq!(hit.collider, Some(wall));
        assert!(hit.has_tag(SemanticTag::Ice));
        assert!((hit.distance - 100.0).abs() < 1e-2);
        assert!((hit.time - 0.5).abs() < 1e-3);
        assert!((hit.normal - Vec3::Z).length() < 1e-3);
    }

    #[test]
    fn raycast_miss_is_not_an_error() {
        let (world, _) = world_with_floor_and_wall();
        let hit = world.raycast(
            Vec3::new(0.0, 50.0, 0.0),
            Vec3::new(0.0, 50.0, 50.0),
            &QueryParams::default(),
        );
        assert!(!hit.blocking);
        assert_eq!(hit.time, 1.0);
    }

    #[test]
    fn raycast_all_is_ordered() {
        let (world, _) = world_with_floor_and_wall();
        let hits = world.raycast_all(
            Vec3::new(0.0, 150.0, -50.0),
            Vec3::new(0.0, -5.0, -50.0),
            &QueryParams::default(),
        );
        assert!(!hits.is_empty());
        assert!(hits.windows(2).all(|w| w[0].time <= w[1].time));
        assert!((hits[0].impact_point.y).abs() < 1e-2);
    }

    #[test]
    fn ignored_collider_is_skipped() {
        let (world, wall) = world_with_floor_and_wall();
        let params = QueryParams::default().ignoring(wall);
        let hit = world.raycast(
            Vec3::new(0.0, 50.0, 0.0),
            Vec3::new(0.0, 50.0, -200.0),
            &params,
        );
        assert!(!hit.blocking);
    }

    #[test]
    fn sweep_stops_before_wall() {
        let (world, _) = world_with_floor_and_wall();
        let shape = ProbeShape::capsule(30.0, 90.0);
        let hit = world.sweep(
            shape,
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::new(0.0, 100.0, -200.0),
            &QueryParams::default(),
        );
        assert!(hit.is_valid_blocking_hit());
        // Capsule front reaches the wall face when its centre is at z = -70.
        assert!((hit.location.z + 70.0).abs() < 0.5);
        assert!(hit.normal.z > 0.9);
    }

    #[test]
    fn overlap_detects_floor() {
        let (world, _) = world_with_floor_and_wall();
        let shape = ProbeShape::capsule(30.0, 90.0);
        let params = QueryParams::default();
        assert!(world.overlap_test(shape, Vec3::new(0.0, 80.0, 0.0), &params));
        assert!(!world.overlap_test(shape, Vec3::new(0.0, 95.0, 0.0), &params));
    }

    #[test]
    fn overlap_catches_embedded_capsules() {
        let (mut world, _) = world_with_floor_and_wall();
        // Thin slab spanning y 100..120, well away from the wall.
        world.add_static_cuboid(Vec3::new(500.0, 110.0, 0.0), 0.0, Vec3::new(200.0, 10.0, 200.0));
        world.update_query_pipeline();
        let shape = ProbeShape::capsule(20.0, 95.0);
        let params = QueryParams::default();

        // Centred on the floor's top face, core running through the floor.
        assert!(world.overlap_test(shape, Vec3::new(-500.0, 0.0, 0.0), &params));
        // Straddling the slab at several heights.
        for y in [97.15, 100.0, 105.0, 110.0, 130.0] {
            assert!(world.overlap_test(shape, Vec3::new(500.0, y, 0.0), &params), "y = {y}");
        }
        // Clear of both.
        assert!(!world.overlap_test(shape, Vec3::new(500.0, 250.0, 0.0), &params));
        assert!(!world.overlap_test(shape, Vec3::new(-500.0, 97.15, 0.0), &params));
        assert!(!world.overlap_test(ProbeShape::Sphere { radius: 5.0 }, Vec3::new(500.0, 90.0, 0.0), &params));
        assert!(world.overlap_test(ProbeShape::Sphere { radius: 5.0 }, Vec3::new(500.0, 110.0, 0.0), &params));
    }
}
