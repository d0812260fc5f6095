mod favorite;

pub use favorite::{FavoriteWithDocument, FAVORITE_SELECT};
