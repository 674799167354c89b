pub mod analytics;
pub mod cash;
pub mod feedback;
pub mod job;
pub mod market;
pub mod oauth;
pub mod portfolio_view;
pub mod user;

pub use analytics::{CrossSignal, IndicatorsResponse, RsiSignal, TimelinePoint, Trend};
pub use cash::{
    BulkReplaceCashTransactions, CapitalPerformance, CashAccount, CashCategory,
    CashLedgerResponse, CashLedgerSummary, CashTransaction, CashTransactionInput,
    TransferRequest, UpdateCashAccount,
};
pub use feedback::{
    BulkUpdateFeedback, CreateFeedback, Feedback, FeedbackCategory, FeedbackListQuery,
    FeedbackListResponse, FeedbackStatus, FeedbackSummary, Severity, UpdateFeedback,
};
pub use job::{JobRow, JobStatus, JobType, NewJob};
pub use market::{
    EodPricePoint, FilingDocument, NewsItem, ScanFieldsResponse, ScanRequest, ScreenRequest,
    StockData, StockDataWithAdvisory,
};
pub use oauth::{
    AuthorizationCode, AuthorizationServerMetadata, AuthorizeParams, ConsentSubmission,
    OAuthClient, ProtectedResourceMetadata, RefreshTokenRow, RegisterClientRequest,
    RegisterClientResponse, TokenRequest, TokenResponse,
};
pub use portfolio_view::{ExternalBalance, ExternalBalanceInput, Holding, Portfolio, UpsertPortfolio};
pub use user::{
    AuthTokenResponse, CreateUser, PublicUser, RoleChange, UpdateUser, UpsertUser, User,
};
