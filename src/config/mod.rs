pub(crate) mod scene_config;
