pub mod favorite_handler;

pub use favorite_handler::{
    __path_add_favorite, __path_list_favorites, __path_remove_favorite, add_favorite,
    list_favorites, remove_favorite,
};
