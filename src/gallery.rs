//! The gallery model: single owner of the grid, caches, and selection.
//!
//! Every mutation enters through a method here and leaves as a
//! [`GalleryEvent`]. Renderers only read: through [`GridDataSource`] and the
//! caption accessors, whose caches use interior locking so `&self` suffices.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use flume::Receiver;
use tracing::{debug, info, trace};

use crate::captions::{CaptionCache, CaptionPipeline};
use crate::config::GalleryConfig;
use crate::error::Result;
use crate::events::{EventBus, GalleryEvent};
use crate::layout::grid::compute_list_hash;
use crate::layout::{
    columns_for_width, layout_caption, CaptionLayout, GridLayout, GridLayoutEngine, LayoutCache,
    TextMeasure,
};
use crate::models::{FileEntry, GridItem, GridPosition, GroupHeader};
use crate::scanner::FileListProvider;
use crate::selection::{SelectionState, SelectionTracker};
use crate::thumbnails::{ReadySender, ThumbnailReadyChannel, ThumbnailUpdateCoalescer};
use crate::view::GridDataSource;

/// Which part of a file's data changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKey {
    Caption,
    Thumbnail,
    /// Anything else shown in the cell (ratings, labels, ...).
    Metadata,
}

pub struct GalleryModel {
    config: GalleryConfig,
    engine: GridLayoutEngine,
    files: Vec<PathBuf>,
    loaded: bool,
    grouped: bool,
    columns: usize,
    cell_width: f32,
    last_rebuild: Option<Instant>,
    pending_rebuild_at: Option<Instant>,
    captions: CaptionCache,
    layouts: LayoutCache,
    pipeline: CaptionPipeline,
    coalescer: ThumbnailUpdateCoalescer,
    ready: ThumbnailReadyChannel,
    selection: SelectionTracker,
    events: EventBus,
}

impl GalleryModel {
    pub fn new(config: GalleryConfig, pipeline: CaptionPipeline) -> Self {
        Self {
            engine: GridLayoutEngine::new(),
            files: Vec::new(),
            loaded: false,
            grouped: config.group_by_folder,
            columns: 1,
            cell_width: config.column_target_width,
            last_rebuild: None,
            pending_rebuild_at: None,
            captions: CaptionCache::new(config.caption_cache_capacity, config.caption_ttl()),
            layouts: LayoutCache::new(config.layout_cache_capacity),
            pipeline,
            coalescer: ThumbnailUpdateCoalescer::new(config.coalesce_delay()),
            ready: ThumbnailReadyChannel::new(),
            selection: SelectionTracker::new(),
            events: EventBus::new(),
            config,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    /// Sender to hand to thumbnail decoders.
    pub fn ready_sender(&self) -> ReadySender {
        self.ready.sender()
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Snapshot of the current grid, safe to keep across rebuilds.
    pub fn layout(&self) -> Arc<GridLayout> {
        self.engine.current()
    }

    pub fn grid(&self) -> &GridLayout {
        self.engine.layout()
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn captions(&self) -> &CaptionCache {
        &self.captions
    }

    pub fn layouts(&self) -> &LayoutCache {
        &self.layouts
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    /// Replaces the file list. An identical list is a no-op; anything else
    /// rebuilds the grid and clears both caches.
    pub fn set_files(&mut self, files: Vec<PathBuf>, now: Instant) -> Result<()> {
        if self.loaded && compute_list_hash(&files) == self.grid().list_hash() {
            trace!(files = files.len(), "File list unchanged");
            return Ok(());
        }

        let layout = GridLayout::build(&files, self.columns, self.grouped)?;
        info!(files = files.len(), "Loaded file list");
        self.files = files;
        self.loaded = true;
        self.captions.clear();
        self.install(layout, now, false);

        let dropped = {
            let grid = self.engine.layout();
            let live: HashSet<&Path> = grid.files().iter().map(|f| f.path.as_path()).collect();
            self.selection.retain_files(&live)
        };
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "Dropped selection for removed files");
        }
        Ok(())
    }

    /// Applies a new viewport width. Column changes rebuild the grid, but no
    /// more often than the configured minimum interval; the rest is deferred
    /// to [`tick`](Self::tick).
    pub fn set_viewport_width(&mut self, width: f32, now: Instant) -> Result<()> {
        let columns = columns_for_width(width, self.config.column_target_width);
        let cell_width = width.max(0.0) / columns as f32;
        if (cell_width - self.cell_width).abs() > f32::EPSILON {
            self.cell_width = cell_width;
            self.layouts.clear();
        }
        self.columns = columns;

        if !self.loaded || columns == self.grid().column_count() {
            self.pending_rebuild_at = None;
            return Ok(());
        }

        let earliest = self
            .last_rebuild
            .map(|at| at + self.config.min_rebuild_interval());
        match earliest {
            Some(at) if now < at => {
                trace!(columns, "Deferring resize rebuild");
                self.pending_rebuild_at = Some(at);
                Ok(())
            }
            _ => self.rebuild(now),
        }
    }

    /// Toggles folder grouping. When both groupings share a shape only the
    /// header labels change and the grid is not reset. A deferred resize is
    /// applied along the way.
    pub fn set_grouped(&mut self, grouped: bool, now: Instant) -> Result<()> {
        if grouped == self.grouped {
            return Ok(());
        }
        self.grouped = grouped;
        if !self.loaded {
            return Ok(());
        }

        let layout = GridLayout::build(&self.files, self.columns, grouped)?;
        let same_shape = layout.shape_matches(self.grid());
        self.install(layout, now, same_shape);
        Ok(())
    }

    /// Runs deferred work: a throttled rebuild and the coalescer deadline.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        if self.pending_rebuild_at.is_some_and(|at| now >= at) {
            self.rebuild(now)?;
        }
        if let Some(range) = self.coalescer.poll(now) {
            self.events.publish(GalleryEvent::RowsChanged(range));
        }
        Ok(())
    }

    /// When [`tick`](Self::tick) next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pending_rebuild_at, self.coalescer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Records a finished thumbnail. Files no longer listed are ignored.
    pub fn thumbnail_ready(&mut self, file: &Path, now: Instant) {
        let Some(pos) = self.grid().position_of_file(file) else {
            trace!(?file, "Thumbnail ready for unlisted file");
            return;
        };
        if let Some(range) = self.coalescer.notify(pos.row, now) {
            self.events.publish(GalleryEvent::RowsChanged(range));
        }
    }

    /// Feeds every queued decoder notification into the coalescer.
    pub fn drain_thumbnails(&mut self, now: Instant) -> usize {
        let ready = self.ready.poll();
        for path in &ready {
            self.thumbnail_ready(path, now);
        }
        ready.len()
    }

    pub fn file_data_changed(&mut self, file: &Path, key: DataKey, now: Instant) {
        match key {
            DataKey::Thumbnail => self.thumbnail_ready(file, now),
            DataKey::Caption => {
                self.captions.invalidate(file);
                if let Some(pos) = self.grid().position_of_file(file) {
                    self.layouts.invalidate(pos);
                    self.publish_cells(pos.row..=pos.row, pos.column..=pos.column);
                }
            }
            DataKey::Metadata => {
                if let Some(pos) = self.grid().position_of_file(file) {
                    self.publish_cells(pos.row..=pos.row, pos.column..=pos.column);
                }
            }
        }
    }

    /// Drops captions and caption layouts for every file in the rectangle.
    /// The rectangle may extend past the grid.
    pub fn invalidate_cells(&mut self, rows: RangeInclusive<usize>, columns: RangeInclusive<usize>) {
        let layout = self.engine.current();
        let last_row = (*rows.end()).min(layout.row_count().saturating_sub(1));
        let last_column = (*columns.end()).min(layout.column_count().saturating_sub(1));
        for row in *rows.start()..=last_row {
            for column in *columns.start()..=last_column {
                if let Some(GridItem::File(index)) = layout.item_at(GridPosition::new(row, column)) {
                    self.captions.invalidate(&layout.files()[index].path);
                }
            }
        }
        let removed = self.layouts.invalidate_range(rows.clone(), columns.clone());
        trace!(removed, "Invalidated caption layouts");
        self.publish_cells(rows, columns);
    }

    /// Swaps the caption pipeline; every cached caption is stale afterwards.
    pub fn set_caption_pipeline(&mut self, pipeline: CaptionPipeline) {
        self.pipeline = pipeline;
        self.captions.clear();
        self.layouts.clear();
        let grid = self.grid();
        if grid.row_count() > 0 {
            let (rows, columns) = (grid.row_count() - 1, grid.column_count() - 1);
            self.publish_cells(0..=rows, 0..=columns);
        }
    }

    pub fn set_current_file(&mut self, file: Option<PathBuf>) {
        let changed = self.selection.set_primary(file);
        self.publish_selection(changed);
    }

    pub fn set_selected_files<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let changed = self.selection.set_selection(files);
        self.publish_selection(changed);
    }

    pub fn set_highlighted_files<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for file in self.selection.set_highlight(files) {
            let event = GalleryEvent::HighlightChanged {
                position: self.grid().position_of_file(&file),
                highlighted: self.selection.is_highlighted(&file),
                file,
            };
            self.events.publish(event);
        }
    }

    /// Pulls the whole state of a file-list provider: list, current file,
    /// and selection.
    pub fn sync_from(&mut self, provider: &dyn FileListProvider, now: Instant) -> Result<()> {
        self.set_files(provider.files().to_vec(), now)?;
        self.set_current_file(provider.current_file().map(Path::to_path_buf));
        self.set_selected_files(provider.selected_files().iter().cloned());
        Ok(())
    }

    /// Caption text for a file, empty when it has none.
    pub fn caption(&self, file: &Path, now: Instant) -> Arc<str> {
        self.captions.get(file, now, |path| self.pipeline.load(path))
    }

    /// Laid-out caption for a file cell, falling back to the file name when
    /// the file has no caption. `None` for header and empty cells.
    ///
    /// The caption is looked up first, so a caption reloaded after its TTL
    /// replaces the cached layout.
    pub fn caption_layout(
        &self,
        pos: GridPosition,
        measure: &dyn TextMeasure,
        now: Instant,
    ) -> Option<Arc<CaptionLayout>> {
        let Some(GridItem::File(index)) = self.grid().item_at(pos) else {
            return None;
        };
        let file = &self.grid().files()[index];
        let caption = self.caption(&file.path, now);
        let layout = self.layouts.get_or_insert_with(pos, &caption, || {
            let text = if caption.is_empty() {
                file.display_name()
            } else {
                caption.to_string()
            };
            layout_caption(&text, self.cell_width, self.config.caption_max_height, measure)
        });
        Some(layout)
    }

    /// Drops expired captions. Returns how many were removed.
    pub fn prune_caches(&self, now: Instant) -> usize {
        self.captions.prune_expired(now)
    }

    fn rebuild(&mut self, now: Instant) -> Result<()> {
        let layout = GridLayout::build(&self.files, self.columns, self.grouped)?;
        self.install(layout, now, false);
        Ok(())
    }

    /// Makes `layout` current. A reset also drops position-keyed state.
    fn install(&mut self, layout: GridLayout, now: Instant, headers_only: bool) {
        let layout = self.engine.install(layout);
        self.last_rebuild = Some(now);
        self.pending_rebuild_at = None;
        if headers_only {
            self.events.publish(GalleryEvent::HeadersChanged);
            return;
        }
        self.layouts.clear();
        self.coalescer.reset();
        self.events.publish(GalleryEvent::Reset {
            rows: layout.row_count(),
            columns: layout.column_count(),
        });
    }

    fn publish_cells(&mut self, rows: RangeInclusive<usize>, columns: RangeInclusive<usize>) {
        self.events.publish(GalleryEvent::CellsChanged { rows, columns });
    }

    fn publish_selection(&mut self, changed: Vec<PathBuf>) {
        for file in changed {
            let event = GalleryEvent::SelectionChanged {
                position: self.grid().position_of_file(&file),
                state: self.selection.display_state(&file),
                file,
            };
            self.events.publish(event);
        }
    }
}

impl GridDataSource for GalleryModel {
    fn row_count(&self) -> usize {
        self.grid().row_count()
    }

    fn column_count(&self) -> usize {
        self.grid().column_count()
    }

    fn item_at(&self, pos: GridPosition) -> Option<GridItem> {
        self.grid().item_at(pos)
    }

    fn header(&self, index: usize) -> Option<&GroupHeader> {
        self.grid().header(index)
    }

    fn file(&self, index: usize) -> Option<&FileEntry> {
        self.grid().file(index)
    }

    fn selection_state(&self, file: &Path) -> SelectionState {
        self.selection.display_state(file)
    }

    fn is_highlighted(&self, file: &Path) -> bool {
        self.selection.is_highlighted(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::{NoCaptions, SidecarCaptionSource};
    use crate::layout::FixedAdvanceMetrics;
    use crate::models::RowRange;
    use crate::scanner::StaticFileList;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn make_paths(folders: &[(&str, usize)]) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for (folder, count) in folders {
            for i in 0..*count {
                paths.push(PathBuf::from(format!("/{}/{}.jpg", folder, i)));
            }
        }
        paths
    }

    fn test_config() -> GalleryConfig {
        GalleryConfig {
            column_target_width: 100.0,
            ..GalleryConfig::default()
        }
    }

    fn make_model(grouped: bool) -> (GalleryModel, Receiver<GalleryEvent>) {
        let config = GalleryConfig {
            group_by_folder: grouped,
            ..test_config()
        };
        let mut model = GalleryModel::new(config, CaptionPipeline::new(NoCaptions));
        let rx = model.subscribe();
        (model, rx)
    }

    fn drain(rx: &Receiver<GalleryEvent>) -> Vec<GalleryEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_grouped_load_publishes_reset() {
        let (mut model, rx) = make_model(true);
        let t0 = Instant::now();
        model.set_viewport_width(300.0, t0).unwrap();
        model.set_files(make_paths(&[("a", 3), ("b", 4)]), t0).unwrap();

        assert_eq!(drain(&rx), vec![GalleryEvent::Reset { rows: 5, columns: 3 }]);
        assert_eq!(model.row_count(), 5);
        assert_eq!(model.grid().headers()[1].start_row, 2);
    }

    #[test]
    fn test_same_list_is_not_rebuilt() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        let paths = make_paths(&[("a", 3)]);
        model.set_files(paths.clone(), t0).unwrap();
        let before = model.layout();
        drain(&rx);

        model.set_files(paths, t0).unwrap();
        assert!(drain(&rx).is_empty());
        assert!(Arc::ptr_eq(&before, &model.layout()));
    }

    #[test]
    fn test_empty_ungrouped_list_has_header_row() {
        let (mut model, rx) = make_model(false);
        model.set_files(Vec::new(), Instant::now()).unwrap();
        assert_eq!(drain(&rx), vec![GalleryEvent::Reset { rows: 1, columns: 1 }]);
    }

    #[test]
    fn test_resize_is_throttled() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        model.set_viewport_width(300.0, t0).unwrap();
        model.set_files(make_paths(&[("a", 12)]), t0).unwrap();
        drain(&rx);

        let t1 = t0 + Duration::from_millis(10);
        model.set_viewport_width(400.0, t1).unwrap();
        assert!(drain(&rx).is_empty());
        assert_eq!(model.grid().column_count(), 3);

        let deadline = model.next_deadline().unwrap();
        assert_eq!(deadline, t0 + model.config().min_rebuild_interval());
        model.tick(deadline).unwrap();
        assert_eq!(drain(&rx), vec![GalleryEvent::Reset { rows: 4, columns: 4 }]);
        assert_eq!(model.next_deadline(), None);
    }

    #[test]
    fn test_resize_back_cancels_pending_rebuild() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        model.set_viewport_width(300.0, t0).unwrap();
        model.set_files(make_paths(&[("a", 6)]), t0).unwrap();
        drain(&rx);

        model.set_viewport_width(450.0, t0 + Duration::from_millis(5)).unwrap();
        model.set_viewport_width(320.0, t0 + Duration::from_millis(8)).unwrap();
        assert_eq!(model.next_deadline(), None);
        model.tick(t0 + Duration::from_secs(1)).unwrap();
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_resize_after_interval_is_immediate() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        model.set_viewport_width(300.0, t0).unwrap();
        model.set_files(make_paths(&[("a", 6)]), t0).unwrap();
        drain(&rx);

        model.set_viewport_width(100.0, t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(drain(&rx), vec![GalleryEvent::Reset { rows: 7, columns: 1 }]);
    }

    #[test]
    fn test_grouping_toggle_with_same_shape_keeps_grid() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        model.set_viewport_width(200.0, t0).unwrap();
        model.set_files(make_paths(&[("a", 5)]), t0).unwrap();
        drain(&rx);

        model.set_grouped(true, t0).unwrap();
        assert_eq!(drain(&rx), vec![GalleryEvent::HeadersChanged]);
        assert_eq!(model.grid().headers()[0].key.label(), "/a");
    }

    #[test]
    fn test_grouping_toggle_with_new_shape_resets() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        model.set_viewport_width(300.0, t0).unwrap();
        model.set_files(make_paths(&[("a", 3), ("b", 4)]), t0).unwrap();
        drain(&rx);

        model.set_grouped(true, t0).unwrap();
        assert_eq!(drain(&rx), vec![GalleryEvent::Reset { rows: 5, columns: 3 }]);
    }

    #[test]
    fn test_thumbnails_coalesce_into_row_ranges() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        model.set_viewport_width(100.0, t0).unwrap();
        let paths = make_paths(&[("a", 600)]);
        model.set_files(paths.clone(), t0).unwrap();
        drain(&rx);

        // One column, header on row 0: file i sits on row i + 1.
        let sender = model.ready_sender();
        for i in [9, 11, 8] {
            sender.notify_ready(paths[i].clone());
        }
        sender.notify_ready("/elsewhere/x.jpg".into());
        assert_eq!(model.drain_thumbnails(t0), 4);
        assert!(drain(&rx).is_empty());

        model.file_data_changed(&paths[499], DataKey::Thumbnail, t0);
        assert_eq!(drain(&rx), vec![GalleryEvent::RowsChanged(RowRange::new(9, 12))]);

        model.tick(t0 + model.config().coalesce_delay()).unwrap();
        assert_eq!(drain(&rx), vec![GalleryEvent::RowsChanged(RowRange::single(500))]);
    }

    #[test]
    fn test_selection_events_carry_state_and_position() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        model.set_viewport_width(200.0, t0).unwrap();
        let paths = make_paths(&[("a", 4)]);
        model.set_files(paths.clone(), t0).unwrap();
        drain(&rx);

        model.set_selected_files([paths[0].clone(), paths[1].clone()]);
        model.set_selected_files([paths[1].clone(), paths[2].clone()]);
        let changed: Vec<PathBuf> = drain(&rx)
            .into_iter()
            .skip(2)
            .map(|event| match event {
                GalleryEvent::SelectionChanged { file, .. } => file,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(changed, vec![paths[0].clone(), paths[2].clone()]);

        model.set_current_file(Some(paths[1].clone()));
        assert_eq!(
            drain(&rx),
            vec![GalleryEvent::SelectionChanged {
                file: paths[1].clone(),
                position: Some(GridPosition::new(1, 1)),
                state: SelectionState::Primary,
            }]
        );

        model.set_highlighted_files([paths[3].clone()]);
        assert_eq!(
            drain(&rx),
            vec![GalleryEvent::HighlightChanged {
                file: paths[3].clone(),
                position: Some(GridPosition::new(2, 1)),
                highlighted: true,
            }]
        );
    }

    #[test]
    fn test_reload_drops_removed_selection() {
        let (mut model, _rx) = make_model(false);
        let t0 = Instant::now();
        let paths = make_paths(&[("a", 3)]);
        model.set_files(paths.clone(), t0).unwrap();
        model.set_current_file(Some(paths[2].clone()));
        model.set_selected_files([paths[0].clone()]);

        model.set_files(paths[..2].to_vec(), t0).unwrap();
        assert_eq!(model.selection().primary(), None);
        assert_eq!(model.selection_state(&paths[0]), SelectionState::Secondary);
    }

    #[test]
    fn test_duplicate_list_keeps_previous_grid() {
        let (mut model, _rx) = make_model(false);
        let t0 = Instant::now();
        model.set_files(make_paths(&[("a", 2)]), t0).unwrap();

        let bad = vec![PathBuf::from("/a/0.jpg"), PathBuf::from("/a/0.jpg")];
        assert!(model.set_files(bad, t0).is_err());
        assert_eq!(model.grid().files().len(), 2);
    }

    #[test]
    fn test_sync_from_provider() {
        let (mut model, _rx) = make_model(false);
        let paths = make_paths(&[("a", 3)]);
        let mut provider = StaticFileList::new(paths.clone());
        provider.set_current(Some(paths[1].clone()));
        provider.set_selected(vec![paths[0].clone()]);

        model.sync_from(&provider, Instant::now()).unwrap();
        assert_eq!(model.selection_state(&paths[1]), SelectionState::Primary);
        assert_eq!(model.selection_state(&paths[0]), SelectionState::Secondary);
        assert_eq!(model.row_count(), 4);
    }

    #[test]
    fn test_caption_layouts_are_cached_and_invalidated() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("cat.jpg");
        let other = dir.path().join("dog.jpg");
        fs::write(dir.path().join("cat.txt"), "tabby").unwrap();

        let mut model = GalleryModel::new(
            test_config(),
            CaptionPipeline::new(SidecarCaptionSource::new()),
        );
        let rx = model.subscribe();
        let t0 = Instant::now();
        model.set_viewport_width(200.0, t0).unwrap();
        model.set_files(vec![image.clone(), other.clone()], t0).unwrap();
        drain(&rx);

        let measure = FixedAdvanceMetrics::default();
        let cat_pos = model.grid().position_of_file(&image).unwrap();
        let first = model.caption_layout(cat_pos, &measure, t0).unwrap();
        assert_eq!(first.fragments[0].text, "tabby");
        let again = model.caption_layout(cat_pos, &measure, t0).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let dog_pos = model.grid().position_of_file(&other).unwrap();
        let fallback = model.caption_layout(dog_pos, &measure, t0).unwrap();
        assert_eq!(fallback.fragments[0].text, "dog.jpg");
        assert!(model.caption_layout(GridPosition::new(0, 0), &measure, t0).is_none());

        fs::write(dir.path().join("cat.txt"), "calico").unwrap();
        model.file_data_changed(&image, DataKey::Caption, t0);
        assert_eq!(
            drain(&rx),
            vec![GalleryEvent::CellsChanged {
                rows: cat_pos.row..=cat_pos.row,
                columns: cat_pos.column..=cat_pos.column,
            }]
        );
        assert!(model.layouts().contains(dog_pos));
        let edited = model.caption_layout(cat_pos, &measure, t0).unwrap();
        assert_eq!(edited.fragments[0].text, "calico");
    }

    #[test]
    fn test_expired_caption_replaces_cached_layout() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("cat.jpg");
        fs::write(dir.path().join("cat.txt"), "tabby").unwrap();

        let mut model = GalleryModel::new(
            test_config(),
            CaptionPipeline::new(SidecarCaptionSource::new()),
        );
        let t0 = Instant::now();
        model.set_viewport_width(200.0, t0).unwrap();
        model.set_files(vec![image.clone()], t0).unwrap();

        let measure = FixedAdvanceMetrics::default();
        let pos = model.grid().position_of_file(&image).unwrap();
        let first = model.caption_layout(pos, &measure, t0).unwrap();
        assert_eq!(first.fragments[0].text, "tabby");

        fs::write(dir.path().join("cat.txt"), "calico").unwrap();
        let before_expiry = t0 + model.config().caption_ttl() / 2;
        let cached = model.caption_layout(pos, &measure, before_expiry).unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        let later = t0 + model.config().caption_ttl() + Duration::from_secs(1);
        assert_eq!(&*model.caption(&image, later), "calico");
        let refreshed = model.caption_layout(pos, &measure, later).unwrap();
        assert_eq!(refreshed.fragments[0].text, "calico");
        assert_eq!(model.layouts().len(), 1);
    }

    #[test]
    fn test_invalidate_cells_clamps_to_grid() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        model.set_viewport_width(200.0, t0).unwrap();
        let paths = make_paths(&[("a", 2)]);
        model.set_files(paths.clone(), t0).unwrap();
        drain(&rx);

        let measure = FixedAdvanceMetrics::default();
        model.caption_layout(GridPosition::new(1, 1), &measure, t0);
        model.invalidate_cells(0..=usize::MAX, 0..=usize::MAX);

        assert!(model.layouts().is_empty());
        assert!(model.captions().is_empty());
        assert_eq!(
            drain(&rx),
            vec![GalleryEvent::CellsChanged {
                rows: 0..=usize::MAX,
                columns: 0..=usize::MAX,
            }]
        );
    }

    #[test]
    fn test_invalidate_cells_leaves_other_rows() {
        let (mut model, rx) = make_model(false);
        let t0 = Instant::now();
        model.set_viewport_width(200.0, t0).unwrap();
        let paths = make_paths(&[("a", 8)]);
        model.set_files(paths.clone(), t0).unwrap();
        drain(&rx);

        let measure = FixedAdvanceMetrics::default();
        for i in 0..paths.len() {
            let pos = model.grid().position_of_index(i).unwrap();
            model.caption_layout(pos, &measure, t0);
        }
        assert_eq!(model.layouts().len(), 8);

        model.invalidate_cells(1..=2, 0..=1);
        assert_eq!(model.layouts().len(), 4);
        assert!(model.layouts().contains(GridPosition::new(3, 0)));
        assert_eq!(drain(&rx).len(), 1);
    }

    #[test]
    fn test_reload_clears_caches() {
        let (mut model, _rx) = make_model(false);
        let t0 = Instant::now();
        model.set_files(make_paths(&[("a", 2)]), t0).unwrap();
        let measure = FixedAdvanceMetrics::default();
        model.caption_layout(GridPosition::new(1, 0), &measure, t0);
        assert!(!model.layouts().is_empty());
        assert!(!model.captions().is_empty());

        model.set_files(make_paths(&[("b", 2)]), t0).unwrap();
        assert!(model.layouts().is_empty());
        assert!(model.captions().is_empty());
    }
}
