use std::thread;
use std::time::Duration;

use thumbstrip_ui::{
    AssetHandle, AssetSnapshot, ImageRequest, ImageSink, ImageSource, ItemChangeDetails,
    QualityPreference, ScrollEvent, Size, ThumbnailStrip, ThumbnailStripListener,
    ThumbnailStripSpec,
};

const ITEM_COUNT: u64 = 24;
const VIEWPORT: Size = Size {
    width: 390.0,
    height: 60.0,
};
const SAMPLES_PER_MOVE: usize = 6;

#[derive(Clone, Debug)]
struct Photo {
    id: u64,
    title: String,
}

impl AssetHandle for Photo {
    fn asset_key(&self) -> u64 {
        self.id
    }
}

/// Produces fake thumbnails on worker threads.
struct ThreadedSource;

impl ImageSource for ThreadedSource {
    type Asset = Photo;
    type Image = String;

    fn fetch(&self, asset: &Photo, request: ImageRequest, mut sink: ImageSink<String>) {
        let title = asset.title.clone();
        thread::spawn(move || {
            let size = request.target_size;
            let dims = format!("{}x{}", size.width as u32, size.height as u32);
            sink.deliver_interim(format!("{title} ~{dims}"));
            if request.quality == QualityPreference::Opportunistic {
                thread::sleep(Duration::from_millis(5));
                sink.deliver_final(format!("{title} {dims}"));
            }
        });
    }
}

struct PrintingListener;

impl ThumbnailStripListener for PrintingListener {
    fn did_drag_item_at(&mut self, index: usize) {
        println!("  drag   -> {index}");
    }

    fn did_scroll_item_at(&mut self, index: usize) {
        println!("  scroll -> {index}");
    }

    fn did_select_item_at(&mut self, index: usize) {
        println!("  select -> {index}");
    }
}

fn photos(order: impl Iterator<Item = u64>) -> AssetSnapshot<Photo> {
    order
        .map(|id| Photo {
            id,
            title: format!("IMG_{:04}", 100 + id),
        })
        .collect::<Vec<_>>()
        .into()
}

type Strip = ThumbnailStrip<ThreadedSource>;

/// Plays scroll requests the way a host scroll view would.
fn apply_scroll_requests(strip: &mut Strip) {
    while let Some(request) = strip.take_scroll_request() {
        log::debug!("host scrolls to {request:?}");
        strip.dispatch(ScrollEvent::PositionChanged {
            offset: request.offset,
        });
        if request.animated {
            strip.dispatch(ScrollEvent::EndScrollAnimation);
        }
    }
}

fn move_to(strip: &mut Strip, to: f32) {
    let from = strip.content_offset();
    for step in 1..=SAMPLES_PER_MOVE {
        let offset = from + (to - from) * step as f32 / SAMPLES_PER_MOVE as f32;
        strip.dispatch(ScrollEvent::PositionChanged { offset });
    }
}

fn wait_for_images(strip: &mut Strip) {
    let mut applied = 0;
    for _ in 0..20 {
        thread::sleep(Duration::from_millis(5));
        applied += strip.process_image_deliveries();
    }
    log::info!("applied {applied} image results");
}

fn describe(strip: &Strip, title: &str) {
    println!(
        "[{title}] selected {:?}, target {:?}, offset {:.1}",
        strip.selected_index(),
        strip.target_index(),
        strip.content_offset()
    );
    let mut bound: Vec<_> = strip
        .cells()
        .filter_map(|cell| Some((cell.index()?, cell)))
        .collect();
    bound.sort_by_key(|(index, _)| *index);
    for (index, cell) in bound {
        println!(
            "  {}{index:>3} w={:<5} {}",
            if cell.is_selected() { '*' } else { ' ' },
            cell.frame().width,
            cell.image().map(String::as_str).unwrap_or("-")
        );
    }
}

pub fn run_session() {
    let spec = ThumbnailStripSpec::new().scale_factor(2.0);
    let mut strip = ThumbnailStrip::new(ThreadedSource, spec);
    strip.set_listener(PrintingListener);
    strip.measure(VIEWPORT);

    strip.set_items(Some(photos(0..ITEM_COUNT)), 3);
    apply_scroll_requests(&mut strip);
    wait_for_images(&mut strip);
    describe(&strip, "opened on item 3");

    println!("drag toward item 8, fling toward item 11");
    strip.dispatch(ScrollEvent::BeginDrag);
    let drag_target = strip
        .layout()
        .centering_offset(8)
        .unwrap_or(strip.content_offset());
    move_to(&mut strip, drag_target);
    let landing = strip.layout().centering_offset(11).unwrap_or(drag_target);
    let snapped = strip
        .dispatch(ScrollEvent::WillEndDrag {
            velocity: 1.8,
            target_offset: landing,
        })
        .unwrap_or(landing);
    strip.dispatch(ScrollEvent::EndDragWithDecel);
    strip.dispatch(ScrollEvent::WillBeginDecelerate);
    move_to(&mut strip, snapped);
    strip.dispatch(ScrollEvent::EndDecelerate);
    apply_scroll_requests(&mut strip);
    wait_for_images(&mut strip);
    describe(&strip, "after fling");

    let neighbor = strip
        .target_index()
        .map(|index| index.saturating_sub(2))
        .and_then(|index| strip.cell_for_index(index))
        .map(|cell| cell.id());
    if let Some(cell) = neighbor {
        println!("tap {cell:?}");
        strip.tap_cell(cell);
        apply_scroll_requests(&mut strip);
        wait_for_images(&mut strip);
        describe(&strip, "after tap");
    }

    println!("library reordered");
    let details = ItemChangeDetails {
        has_incremental_changes: true,
        has_moves: true,
        ..ItemChangeDetails::default()
    };
    strip.items_did_change(Some(photos((0..ITEM_COUNT).rev())), &details);
    apply_scroll_requests(&mut strip);
    wait_for_images(&mut strip);
    describe(&strip, "after reorder");
}
