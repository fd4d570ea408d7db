// Wayland integration module
// Layer-shell implementation of the overlay window, plus the event loop

use crate::cli::OverlayArgs;
use crate::dialog::ErrorDialog;
use crate::error::OverlayError;
use crate::geometry::Geometry;
use crate::image_loader::ImageData;
use crate::overlay::{OverlayController, KEEP_ON_TOP_INTERVAL};
use crate::platform::{ExtendedStyle, WindowPlatform};
use crate::render;
use crate::timer::KeepOnTopTimer;
use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState, Region},
    delegate_compositor, delegate_layer, delegate_output, delegate_registry, delegate_shm,
    output::{OutputHandler, OutputState},
    reexports::{
        calloop::EventLoop,
        calloop_wayland_source::WaylandSource,
    },
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    shell::{
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
    shm::{
        slot::{Buffer, SlotPool},
        Shm, ShmHandler,
    },
};
use wayland_client::{
    globals::{registry_queue_init, GlobalList},
    protocol::{wl_output, wl_shm, wl_surface},
    Connection, QueueHandle,
};

/// Layer-shell namespace of the overlay surface
const NAMESPACE: &str = "overlay";

/// Maximum window size to prevent buffer allocation failures
const MAX_SIZE: u32 = 4096;

/// Maximum buffer size (64MB to avoid Wayland buffer issues)
const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Layer used while the topmost flag is cleared
const NOT_TOPMOST_LAYER: Layer = Layer::Top;

/// The overlay window and the Wayland state backing it
struct WaylandOverlay {
    // Registry state
    registry_state: RegistryState,
    // Output state for display info
    output_state: OutputState,
    // Shared memory for buffer allocation
    shm: Shm,
    // Layer shell for overlay windows
    #[allow(dead_code)]
    layer_shell: LayerShell,
    // Compositor state (also creates input regions)
    compositor_state: CompositorState,

    // The window handle; `None` once closed
    layer_surface: Option<LayerSurface>,
    pool: Option<SlotPool>,
    buffer: Option<Buffer>,

    // Requested placement, reported back verbatim
    geometry: Geometry,
    // Size in pixels the buffer is rendered at
    width: u32,
    height: u32,
    configured: bool,
    shown: bool,

    // Extended style bits
    top_most: bool,
    input_transparent: bool,

    image: Option<ImageData>,
    should_exit: bool,
}

impl WaylandOverlay {
    /// Bind the required globals and create the (uncommitted) layer surface
    fn new(globals: &GlobalList, qh: &QueueHandle<Self>) -> Result<Self> {
        let compositor_state =
            CompositorState::bind(globals, qh).context("Failed to bind compositor")?;
        let layer_shell = LayerShell::bind(globals, qh).context("Failed to bind layer shell")?;
        let shm = Shm::bind(globals, qh).context("Failed to bind shm")?;

        let surface = compositor_state.create_surface(qh);
        let layer_surface =
            layer_shell.create_layer_surface(qh, surface, Layer::Overlay, Some(NAMESPACE), None);

        Ok(Self {
            registry_state: RegistryState::new(globals),
            output_state: OutputState::new(globals, qh),
            shm,
            layer_shell,
            compositor_state,
            layer_surface: Some(layer_surface),
            pool: None,
            buffer: None,
            geometry: Geometry::new(0.0, 0.0, 0.0, 0.0),
            width: 0,
            height: 0,
            configured: false,
            shown: false,
            top_most: true,
            input_transparent: false,
            image: None,
            should_exit: false,
        })
    }

    /// Commit pending surface state once the surface has been mapped
    fn commit(&self) {
        if !self.shown {
            return;
        }
        if let Some(ref layer_surface) = self.layer_surface {
            layer_surface.commit();
        }
    }

    fn apply_input_region(&self, layer_surface: &LayerSurface, transparent: bool) {
        let surface = layer_surface.wl_surface();
        if !transparent {
            // A null region accepts input everywhere
            surface.set_input_region(None);
            return;
        }
        match Region::new(&self.compositor_state) {
            // The compositor copies the region, so it can be destroyed right away
            Ok(region) => surface.set_input_region(Some(region.wl_region())),
            Err(e) => warn!("Failed to create empty input region: {}", e),
        }
    }

    /// Draw the image stretched over the whole surface
    fn draw(&mut self) {
        if !self.configured || self.layer_surface.is_none() {
            return;
        }
        let Some(image) = self.image.as_ref() else {
            return;
        };

        let width = self.width.clamp(1, MAX_SIZE);
        let height = self.height.clamp(1, MAX_SIZE);

        // Calculate buffer size (4 bytes per pixel for ARGB)
        let stride = width as i32 * 4;
        let buffer_size = stride as usize * height as usize;
        if buffer_size > MAX_BUFFER_SIZE {
            error!(
                "Buffer size too large: {} bytes, max: {} bytes",
                buffer_size, MAX_BUFFER_SIZE
            );
            return;
        }

        // Initialize pool if needed
        if self.pool.is_none() {
            match SlotPool::new(buffer_size, &self.shm) {
                Ok(pool) => self.pool = Some(pool),
                Err(e) => {
                    error!(
                        "Failed to create slot pool: {}. Buffer size: {} bytes",
                        e, buffer_size
                    );
                    return;
                }
            }
        }
        let Some(pool) = self.pool.as_mut() else {
            return;
        };

        // Resize pool if needed
        if pool.len() < buffer_size {
            if let Err(e) = pool.resize(buffer_size) {
                error!("Failed to resize pool to {} bytes: {}", buffer_size, e);
                self.pool = None;
                return;
            }
        }

        let (buffer, canvas) = match pool.create_buffer(
            width as i32,
            height as i32,
            stride,
            wl_shm::Format::Argb8888,
        ) {
            Ok(buf) => buf,
            Err(e) => {
                error!("Failed to create buffer {}x{}: {}", width, height, e);
                return;
            }
        };

        render::stretch_to_fill(image, canvas, width, height);

        let Some(layer_surface) = self.layer_surface.as_ref() else {
            return;
        };
        let surface = layer_surface.wl_surface();
        if let Err(e) = buffer.attach_to(surface) {
            error!("Failed to attach buffer: {}", e);
            return;
        }
        surface.damage_buffer(0, 0, width as i32, height as i32);
        surface.commit();

        debug!("Drew {}x{} image into {}x{} buffer", image.width, image.height, width, height);
        self.buffer = Some(buffer);
    }
}

impl WindowPlatform for WaylandOverlay {
    fn apply_geometry(&mut self, geometry: &Geometry) {
        self.geometry = *geometry;

        let (width, height) = geometry.surface_size();
        if width > MAX_SIZE || height > MAX_SIZE {
            warn!(
                "Requested size {}x{} exceeds {}px, clamping",
                width, height, MAX_SIZE
            );
        }
        self.width = width.min(MAX_SIZE);
        self.height = height.min(MAX_SIZE);

        if let Some(ref layer_surface) = self.layer_surface {
            let (top, right, bottom, left) = geometry.margins();
            layer_surface.set_anchor(Anchor::TOP | Anchor::LEFT);
            layer_surface.set_margin(top, right, bottom, left);
            layer_surface.set_size(self.width, self.height);
        }
        info!(
            "Overlay geometry: left={} top={} width={} height={}",
            geometry.left, geometry.top, geometry.width, geometry.height
        );
        self.commit();
    }

    fn apply_overlay_style(&mut self) {
        // Layer surfaces have no decorations, no resize edges and never show
        // up in task switchers; transparency comes from the ARGB buffer.
        if let Some(ref layer_surface) = self.layer_surface {
            layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
            layer_surface.set_exclusive_zone(-1);
            layer_surface.set_layer(Layer::Overlay);
        }
        self.top_most = true;
        self.commit();
    }

    fn set_extended_style(&mut self, style: ExtendedStyle, enabled: bool) {
        let Some(layer_surface) = self.layer_surface.as_ref() else {
            return;
        };
        match style {
            ExtendedStyle::InputTransparent => {
                self.apply_input_region(layer_surface, enabled);
                self.input_transparent = enabled;
            }
            ExtendedStyle::TopMost => {
                let layer = if enabled {
                    Layer::Overlay
                } else {
                    NOT_TOPMOST_LAYER
                };
                layer_surface.set_layer(layer);
                self.top_most = enabled;
            }
        }
        debug!("Extended style {:?} = {}", style, enabled);
        // Each change is its own commit so the compositor sees every transition
        self.commit();
    }

    fn extended_style(&self, style: ExtendedStyle) -> bool {
        match style {
            ExtendedStyle::InputTransparent => self.input_transparent,
            ExtendedStyle::TopMost => self.top_most,
        }
    }

    fn set_content(&mut self, image: ImageData) {
        self.image = Some(image);
        self.draw();
    }

    fn show(&mut self) {
        if let Some(ref layer_surface) = self.layer_surface {
            // The first commit maps the surface and triggers a configure
            layer_surface.commit();
            self.shown = true;
        }
    }

    fn close(&mut self) {
        if self.layer_surface.take().is_some() {
            info!("Closing overlay window");
        }
        self.buffer = None;
        self.pool = None;
        self.shown = false;
        self.should_exit = true;
    }

    fn is_open(&self) -> bool {
        self.layer_surface.is_some()
    }

    fn bounds(&self) -> Geometry {
        self.geometry
    }
}

// Implement required traits for smithay-client-toolkit

impl CompositorHandler for WaylandOverlay {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        new_factor: i32,
    ) {
        debug!("Scale factor changed: {}", new_factor);
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
        debug!("Transform changed");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for WaylandOverlay {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        output: wl_output::WlOutput,
    ) {
        if let Some(info) = self.output_state.info(&output) {
            debug!("New output: {:?} at {:?}", info.name, info.logical_position);
        }
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output updated");
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output destroyed");
    }
}

impl LayerShellHandler for WaylandOverlay {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        info!("Layer surface closed by compositor");
        self.close();
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        debug!("Layer surface configured: {:?}", configure);

        // Zero means the client picks; keep the requested size then
        if configure.new_size.0 > 0 && configure.new_size.0 != self.width {
            self.width = configure.new_size.0;
            self.pool = None;
        }
        if configure.new_size.1 > 0 && configure.new_size.1 != self.height {
            self.height = configure.new_size.1;
            self.pool = None;
        }

        self.configured = true;
        self.draw();
    }
}

impl ShmHandler for WaylandOverlay {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm
    }
}

impl ProvidesRegistryState for WaylandOverlay {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState];
}

// Delegate macros
delegate_compositor!(WaylandOverlay);
delegate_output!(WaylandOverlay);
delegate_layer!(WaylandOverlay);
delegate_shm!(WaylandOverlay);
delegate_registry!(WaylandOverlay);

/// Connect, create the overlay surface and hook Wayland into the event loop
fn connect() -> Result<(EventLoop<'static, WaylandOverlay>, WaylandOverlay)> {
    info!("Connecting to Wayland display");

    let conn = Connection::connect_to_env().context("Failed to connect to Wayland display")?;

    // Initialize registry and event queue
    let (globals, event_queue) =
        registry_queue_init::<WaylandOverlay>(&conn).context("Failed to initialize registry")?;
    let qh = event_queue.handle();

    let app = WaylandOverlay::new(&globals, &qh)?;

    let event_loop =
        EventLoop::<WaylandOverlay>::try_new().context("Failed to create event loop")?;
    WaylandSource::new(conn, event_queue)
        .insert(event_loop.handle())
        .map_err(|e| anyhow!("Failed to insert Wayland source: {}", e.error))?;

    Ok((event_loop, app))
}

/// Run the overlay until its window closes
pub fn run<D: ErrorDialog>(
    controller: &mut OverlayController<D>,
    args: &OverlayArgs,
) -> Result<(), OverlayError> {
    let (mut event_loop, mut app) = connect().map_err(|e| controller.abort(e.into()))?;

    controller.launch(&mut app, args)?;

    let mut keep_on_top = KeepOnTopTimer::start(event_loop.handle())
        .map_err(|e| controller.fail(&mut app, e.into()))?;

    info!(
        "Overlay running at {:?} (topmost: {}, click-through: {})",
        app.bounds(),
        app.extended_style(ExtendedStyle::TopMost),
        app.extended_style(ExtendedStyle::InputTransparent)
    );
    info!("Starting event loop");

    // Main event loop
    let result = loop {
        if app.should_exit {
            info!("Exiting application");
            break Ok(());
        }
        if let Err(e) = event_loop.dispatch(KEEP_ON_TOP_INTERVAL, &mut app) {
            // The display is gone, so there is nothing left to show a dialog on
            error!("Wayland event loop failed: {}", e);
            break Err(OverlayError::Platform(
                anyhow::Error::new(e).context("Wayland event loop failed"),
            ));
        }
    };

    keep_on_top.stop();
    controller.shutdown(&mut app);
    result
}
