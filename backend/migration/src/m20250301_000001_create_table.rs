use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contest::Table)
                    .col(
                        ColumnDef::new(Contest::Id)
                            .integer()
                            .auto_increment()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contest::Name).string().not_null())
                    .col(ColumnDef::new(Contest::Description).text().not_null())
                    .col(ColumnDef::new(Contest::Begin).date_time())
                    .col(ColumnDef::new(Contest::End).date_time())
                    .col(
                        ColumnDef::new(Contest::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Contest::CreateAt).date_time().not_null())
                    .col(ColumnDef::new(Contest::UpdateAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Contestant::Table)
                    .col(
                        ColumnDef::new(Contestant::Id)
                            .integer()
                            .auto_increment()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contestant::ContestId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-contestant-contest")
                            .from(Contestant::Table, Contestant::ContestId)
                            .to(Contest::Table, Contest::Id),
                    )
                    .col(
                        ColumnDef::new(Contestant::RegNumber)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contestant::FirstName).string().not_null())
                    .col(ColumnDef::new(Contestant::LastName).string().not_null())
                    .col(ColumnDef::new(Contestant::Email).string().not_null())
                    .col(ColumnDef::new(Contestant::Phone).string().not_null())
                    .col(ColumnDef::new(Contestant::Organization).string().not_null())
                    .col(ColumnDef::new(Contestant::Category).string_len(16).not_null())
                    .col(ColumnDef::new(Contestant::CreateAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-contestant-reg_number")
                    .table(Contestant::Table)
                    .col(Contestant::RegNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-contestant-contest-email")
                    .table(Contestant::Table)
                    .col(Contestant::ContestId)
                    .col(Contestant::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Problem::Table)
                    .col(
                        ColumnDef::new(Problem::Id)
                            .integer()
                            .auto_increment()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Problem::ContestId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-problem-contest")
                            .from(Problem::Table, Problem::ContestId)
                            .to(Contest::Table, Contest::Id),
                    )
                    .col(ColumnDef::new(Problem::Title).string().not_null())
                    .col(ColumnDef::new(Problem::MaxPoints).integer().not_null())
                    .col(ColumnDef::new(Problem::Order).integer().not_null())
                    .col(ColumnDef::new(Problem::CreateAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Subtask::Table)
                    .col(
                        ColumnDef::new(Subtask::Id)
                            .integer()
                            .auto_increment()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Subtask::ProblemId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subtask-problem")
                            .from(Subtask::Table, Subtask::ProblemId)
                            .to(Problem::Table, Problem::Id),
                    )
                    .col(ColumnDef::new(Subtask::Label).string().not_null())
                    .col(ColumnDef::new(Subtask::Points).integer().not_null())
                    .col(ColumnDef::new(Subtask::TestCount).integer().not_null())
                    .col(ColumnDef::new(Subtask::Order).integer().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .col(
                        ColumnDef::new(Submission::Id)
                            .integer()
                            .auto_increment()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submission::ContestantId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submission-contestant")
                            .from(Submission::Table, Submission::ContestantId)
                            .to(Contestant::Table, Contestant::Id),
                    )
                    .col(ColumnDef::new(Submission::ProblemId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submission-problem")
                            .from(Submission::Table, Submission::ProblemId)
                            .to(Problem::Table, Problem::Id),
                    )
                    .col(ColumnDef::new(Submission::UploadAt).date_time().not_null())
                    .col(
                        ColumnDef::new(Submission::TotalPoints)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-submission-contestant-problem")
                    .table(Submission::Table)
                    .col(Submission::ContestantId)
                    .col(Submission::ProblemId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(SubtaskScore::Table)
                    .col(
                        ColumnDef::new(SubtaskScore::Id)
                            .integer()
                            .auto_increment()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubtaskScore::SubmissionId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subtask_score-submission")
                            .from(SubtaskScore::Table, SubtaskScore::SubmissionId)
                            .to(Submission::Table, Submission::Id),
                    )
                    .col(ColumnDef::new(SubtaskScore::SubtaskId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subtask_score-subtask")
                            .from(SubtaskScore::Table, SubtaskScore::SubtaskId)
                            .to(Subtask::Table, Subtask::Id),
                    )
                    .col(ColumnDef::new(SubtaskScore::Passed).boolean().not_null())
                    .col(
                        ColumnDef::new(SubtaskScore::PointsAwarded)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Leaderboard::Table)
                    .col(
                        ColumnDef::new(Leaderboard::Id)
                            .integer()
                            .auto_increment()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Leaderboard::ContestId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-leaderboard-contest")
                            .from(Leaderboard::Table, Leaderboard::ContestId)
                            .to(Contest::Table, Contest::Id),
                    )
                    .col(
                        ColumnDef::new(Leaderboard::ContestantId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-leaderboard-contestant")
                            .from(Leaderboard::Table, Leaderboard::ContestantId)
                            .to(Contestant::Table, Contestant::Id),
                    )
                    .col(
                        ColumnDef::new(Leaderboard::TotalPoints)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Leaderboard::PenaltyMinutes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Leaderboard::Rank)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Leaderboard::UpdateAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-leaderboard-contest-contestant")
                    .table(Leaderboard::Table)
                    .col(Leaderboard::ContestId)
                    .col(Leaderboard::ContestantId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leaderboard::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubtaskScore::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subtask::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Problem::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contestant::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contest::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Contest {
    Table,
    Id,
    Name,
    Description,
    Begin,
    End,
    Status,
    CreateAt,
    UpdateAt,
}

#[derive(Iden)]
enum Contestant {
    Table,
    Id,
    ContestId,
    RegNumber,
    FirstName,
    LastName,
    Email,
    Phone,
    Organization,
    Category,
    CreateAt,
}

#[derive(Iden)]
enum Problem {
    Table,
    Id,
    ContestId,
    Title,
    MaxPoints,
    Order,
    CreateAt,
}

#[derive(Iden)]
enum Subtask {
    Table,
    Id,
    ProblemId,
    Label,
    Points,
    TestCount,
    Order,
}

#[derive(Iden)]
enum Submission {
    Table,
    Id,
    ContestantId,
    ProblemId,
    UploadAt,
    TotalPoints,
}

#[derive(Iden)]
enum SubtaskScore {
    Table,
    Id,
    SubmissionId,
    SubtaskId,
    Passed,
    PointsAwarded,
}

#[derive(Iden)]
enum Leaderboard {
    Table,
    Id,
    ContestId,
    ContestantId,
    TotalPoints,
    PenaltyMinutes,
    Rank,
    UpdateAt,
}
