use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use image::RgbImage;

use crate::camera::Camera;
use crate::color;
use crate::error::RenderError;
use crate::film::ImageCl;
use crate::object::Object;
use crate::scene::Scene;

/// Shared state of one rendering run: the immutable scene on one side, the
/// row counter and the write-locked accumulation image on the other.
struct ImageCreator<'a> {
    scene: &'a Scene,
    lights: Vec<&'a Object>,
    camera: Camera,
    image: Mutex<ImageCl>,
    row_count: AtomicUsize,
    cancel: Option<&'a AtomicBool>,
}

/// Render the scene to an 8-bit RGB image.
pub fn render(scene: &Scene) -> Result<RgbImage, RenderError> {
    render_with_cancel(scene, None)
}

/// Render with a cooperative cancellation flag, checked before each row is
/// claimed. On cancellation workers finish their current row and exit; the
/// image is returned with the remaining rows left at the background color.
pub fn render_with_cancel(
    scene: &Scene,
    cancel: Option<&AtomicBool>,
) -> Result<RgbImage, RenderError> {
    let threads = scene.threads.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| RenderError::Pool(e.to_string()))?;

    let creator = ImageCreator {
        scene,
        lights: scene.light.flatten(),
        camera: scene.camera(),
        image: Mutex::new(ImageCl::new(
            scene.image_width,
            scene.image_height,
            scene.background_color,
        )),
        row_count: AtomicUsize::new(0),
        cancel,
    };

    pool.scope(|s| {
        for _ in 0..threads {
            s.spawn(|_| creator.work());
        }
    });

    let image = creator
        .image
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    Ok(image.to_rgb8())
}

impl ImageCreator<'_> {
    /// Worker loop: claim a row, trace it into a local buffer, publish it.
    fn work(&self) {
        let width = self.scene.image_width;
        let height = self.scene.image_height;

        let unit = (height / 2).max(1) as f64;
        let unit_f = 1.0 / unit;

        let mut row = vec![self.scene.background_color; width];

        loop {
            if self.cancel.map_or(false, |c| c.load(Ordering::Relaxed)) {
                break;
            }

            let row_num = self.row_count.fetch_add(1, Ordering::SeqCst);
            if row_num >= height {
                break;
            }
            if row_num % 100 == 0 {
                log::info!("{:5.1}%", 100.0 * row_num as f64 / height as f64);
            }

            let z = unit_f * (0.5 + (height as isize / 2 - row_num as isize) as f64);

            for (i, pixel) in row.iter_mut().enumerate() {
                let x = unit_f * (0.5 + (i as isize - width as isize / 2) as f64);

                let ray = self.camera.cast(x, z);

                *pixel = match self.scene.hit(&ray) {
                    Some(hit) => color::saturate(
                        self.scene.lum(&self.lights, &hit, &ray, self.scene.trace_depth),
                        self.scene.gamma,
                    ),
                    None => self.scene.background_color,
                };
            }

            let mut image = self
                .image
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            image.set_row(row_num, &row);
        }
    }
}
