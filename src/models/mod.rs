mod doubt;
mod group;
mod post;
mod social;
mod user;

pub use doubt::{
    CreateDoubtRequest, Doubt, DoubtListQuery, DoubtReply, DoubtStatus, MarkSolutionRequest,
    ReplyRequest,
};
pub use group::{CreateGroupRequest, Group, Membership};
pub use post::{
    CommentRequest, Comment, CreatePostRequest, Post, Reaction, ReactionRequest,
};
pub use social::{
    FriendRequest, RequestStatus, RespondAction, RespondRequest, SendFriendRequestBody,
};
pub use user::{LoginRequest, Profile, RegisterRequest, UpdateProfileRequest, User};
